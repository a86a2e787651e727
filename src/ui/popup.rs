//! Popup overlay widgets for the settings menu, the controls submenu and
//! single-line text prompts.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::{SettingsItem, SETTINGS_ITEMS};
use crate::app::state::AppState;
use crate::config::{Action, AppConfig};
use crate::ui::theme::Theme;

fn popup_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(true))
        .style(theme.panel_style())
}

// ───────────────────────────────────────── settings popup ────

/// Settings menu popup overlay.
pub struct SettingsPopup<'a> {
    pub selected: usize,
    pub state: &'a AppState,
}

impl<'a> Widget for SettingsPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = &self.state.theme;
        let height = (SETTINGS_ITEMS.len() as u16) + 6;
        let popup = centered_fixed(44, height, area);
        Clear.render(popup, buf);

        let block = popup_block(" Settings ", theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = Vec::new();
        lines.push(Line::raw(""));
        for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
            let (prefix, style) = if i == self.selected {
                (" ▸ ", theme.selected_style())
            } else {
                ("   ", theme.file_style())
            };
            let label = format!("{prefix}{:<22}", item.label());

            let value = match item {
                SettingsItem::Submenu { .. } => Span::styled("›", theme.muted_style()),
                SettingsItem::Toggle { get, .. } => {
                    let on = get(self.state);
                    Span::styled(if on { "[ON]" } else { "[OFF]" }, theme.toggle_style(on))
                }
                SettingsItem::Cycle { value, .. } => {
                    Span::styled(value(self.state), theme.toggle_style(true))
                }
            };
            lines.push(Line::from(vec![Span::styled(label, style), value]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter/Space: change  Esc: close",
            theme.muted_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── controls popup ────

/// Interactive controls / keybinding popup overlay.
pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub theme: &'a Theme,
    pub selected: usize,
    pub awaiting_rebind: bool,
}

impl<'a> Widget for ControlsPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(60, height, area);
        Clear.render(popup, buf);

        let block = popup_block(" Controls ", self.theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = Vec::new();
        lines.push(Line::raw(""));

        for (i, &action) in Action::ALL.iter().enumerate() {
            let is_selected = i == self.selected;
            let prefix = if is_selected { " ▸ " } else { "   " };

            let keys_display = if is_selected && self.awaiting_rebind {
                "Press a key…".to_string()
            } else {
                self.config.display_bindings(action)
            };

            let base_style = if is_selected {
                self.theme.selected_style()
            } else {
                self.theme.file_style()
            };
            let key_style = if is_selected {
                self.theme.selected_style().patch(self.theme.folder_style())
            } else {
                self.theme.folder_style()
            };

            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("{prefix}{:<22}", action.label());
            let keys_width = (inner.width as usize)
                .saturating_sub(label_col.chars().count())
                .max(1);
            let keys_col = format!("{keys_display:>keys_width$}");

            lines.push(Line::from(vec![
                Span::styled(label_col, base_style),
                Span::styled(keys_col, key_style),
            ]));
        }

        let is_reset_selected = self.selected == Action::ALL.len();
        lines.push(Line::raw(""));
        let reset_style = if is_reset_selected {
            self.theme.selected_style()
        } else {
            self.theme.file_style()
        };
        let reset_prefix = if is_reset_selected { " ▸ " } else { "   " };
        lines.push(Line::from(Span::styled(
            format!("{reset_prefix}⟳ Reset to defaults"),
            reset_style,
        )));

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter: add key  Del: clear  Esc: back",
            self.theme.muted_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── text prompt ───────

/// Single-line input box (new file/folder name, save-as path).
pub struct PromptPopup<'a> {
    pub title: &'a str,
    pub input: &'a str,
    pub error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Widget for PromptPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_fixed(60, 6, area);
        Clear.render(popup, buf);

        let title = format!(" {} ", self.title);
        let block = popup_block(&title, self.theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let footer = match self.error {
            Some(err) => Span::styled(format!(" {err}"), self.theme.error_style()),
            None => Span::styled(" Enter: confirm  Esc: cancel", self.theme.muted_style()),
        };
        let lines = vec![
            Line::raw(""),
            Line::from(vec![
                Span::styled(format!(" {}", self.input), self.theme.input_style()),
                Span::styled("█", self.theme.muted_style()),
            ]),
            Line::raw(""),
            Line::from(footer),
        ];
        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
