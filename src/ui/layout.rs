//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const SIDEBAR_WIDTH: u16 = 32;
const TERMINAL_HEIGHT: u16 = 12;

/// Primary screen layout: sidebar on the left; tab bar, editor and terminal
/// panel stacked on the right; status bar along the bottom.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    /// Zero-sized when the sidebar is hidden.
    pub sidebar_area: Rect,
    pub tabs_area: Rect,
    pub editor_area: Rect,
    /// Zero-sized when the terminal panel is hidden.
    pub terminal_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect, show_sidebar: bool, show_terminal: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // workbench (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let sidebar_width = if show_sidebar {
            SIDEBAR_WIDTH.min(rows[0].width / 2)
        } else {
            0
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(10)])
            .split(rows[0]);

        let terminal_height = if show_terminal {
            TERMINAL_HEIGHT.min(cols[1].height / 2)
        } else {
            0
        };
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),               // tab bar
                Constraint::Min(1),                  // editor
                Constraint::Length(terminal_height), // terminal panel
            ])
            .split(cols[1]);

        Self {
            sidebar_area: cols[0],
            tabs_area: main[0],
            editor_area: main[1],
            terminal_area: main[2],
            status_area: rows[1],
        }
    }
}

/// Is `(x, y)` inside `rect`?
pub fn contains(rect: Rect, x: u16, y: u16) -> bool {
    rect.width > 0
        && rect.height > 0
        && x >= rect.x
        && x < rect.x + rect.width
        && y >= rect.y
        && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_panels_collapse_to_zero() {
        let l = AppLayout::from_area(Rect::new(0, 0, 120, 40), false, false);
        assert_eq!(l.sidebar_area.width, 0);
        assert_eq!(l.terminal_area.height, 0);
        assert_eq!(l.editor_area.width, 120);
        assert_eq!(l.status_area.y, 39);
    }

    #[test]
    fn full_layout_regions() {
        let l = AppLayout::from_area(Rect::new(0, 0, 120, 40), true, true);
        assert_eq!(l.sidebar_area.width, SIDEBAR_WIDTH);
        assert_eq!(l.tabs_area.height, 1);
        assert_eq!(l.terminal_area.height, TERMINAL_HEIGHT);
        assert_eq!(l.editor_area.x, SIDEBAR_WIDTH);
        assert!(contains(l.editor_area, SIDEBAR_WIDTH, 2));
        assert!(!contains(l.sidebar_area, SIDEBAR_WIDTH, 2));
    }
}
