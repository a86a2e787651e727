//! Colour palettes and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeKind;

/// Central theme: change colours here and they propagate everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    folder: Color,
    selection_bg: Color,
    chrome_bg: Color,
    border: Color,
    error: Color,
    success: Color,
    highlight: Color,
}

impl Theme {
    pub fn for_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self {
                bg: Color::Rgb(30, 30, 30),
                fg: Color::Rgb(212, 212, 212),
                muted: Color::Rgb(133, 133, 133),
                accent: Color::Rgb(0, 122, 204),
                folder: Color::Rgb(220, 180, 110),
                selection_bg: Color::Rgb(38, 79, 120),
                chrome_bg: Color::Rgb(37, 37, 38),
                border: Color::Rgb(68, 68, 68),
                error: Color::Rgb(244, 135, 113),
                success: Color::Rgb(137, 209, 133),
                highlight: Color::Rgb(81, 92, 106),
            },
            ThemeKind::Light => Self {
                bg: Color::Rgb(255, 255, 255),
                fg: Color::Rgb(30, 30, 30),
                muted: Color::Rgb(110, 110, 110),
                accent: Color::Rgb(0, 95, 184),
                folder: Color::Rgb(150, 100, 20),
                selection_bg: Color::Rgb(173, 214, 255),
                chrome_bg: Color::Rgb(243, 243, 243),
                border: Color::Rgb(200, 200, 200),
                error: Color::Rgb(205, 49, 49),
                success: Color::Rgb(22, 130, 93),
                highlight: Color::Rgb(250, 222, 130),
            },
            ThemeKind::HighContrast => Self {
                bg: Color::Black,
                fg: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                folder: Color::Yellow,
                selection_bg: Color::Blue,
                chrome_bg: Color::Black,
                border: Color::White,
                error: Color::LightRed,
                success: Color::LightGreen,
                highlight: Color::Magenta,
            },
        }
    }

    // ── explorer ───────────────────────────────────────────────
    pub fn folder_style(&self) -> Style {
        Style::default().fg(self.folder).add_modifier(Modifier::BOLD)
    }

    pub fn file_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    // ── editor ─────────────────────────────────────────────────
    pub fn editor_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn line_number_style(&self) -> Style {
        Style::default().fg(self.muted).bg(self.bg)
    }

    pub fn cursor_line_style(&self) -> Style {
        Style::default().add_modifier(Modifier::UNDERLINED)
    }

    pub fn match_style(&self) -> Style {
        Style::default().bg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn tab_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.fg)
                .bg(self.bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.muted).bg(self.chrome_bg)
        }
    }

    // ── terminal ───────────────────────────────────────────────
    pub fn prompt_style(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn panel_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.chrome_bg)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.accent).fg(Color::White)
    }

    pub fn input_style(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn toggle_style(&self, on: bool) -> Style {
        if on {
            Style::default().fg(self.success).add_modifier(Modifier::BOLD)
        } else {
            self.muted_style()
        }
    }
}
