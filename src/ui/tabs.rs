//! Tab bar above the editor.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::core::file::{EditorFile, FileId};

use super::theme::Theme;

/// Label of one tab, dirty marker included.
pub fn tab_label(file: &EditorFile) -> String {
    let marker = if file.dirty { "●" } else { "×" };
    format!(" {} {marker} ", file.name)
}

/// Horizontal extent `(x, width)` of each tab, relative to the bar's left
/// edge.  Shared by the renderer and mouse hit-testing.
pub fn tab_extents(labels: &[String]) -> Vec<(u16, u16)> {
    let mut x: u16 = 0;
    labels
        .iter()
        .map(|l| {
            let w = l.chars().count() as u16;
            let extent = (x, w);
            x = x.saturating_add(w + 1);
            extent
        })
        .collect()
}

/// Index of the tab under column `col` (relative to the bar).
pub fn tab_at(labels: &[String], col: u16) -> Option<usize> {
    tab_extents(labels)
        .iter()
        .position(|&(x, w)| col >= x && col < x + w)
}

pub struct TabBar<'a> {
    pub tabs: Vec<&'a EditorFile>,
    pub active: Option<FileId>,
    pub theme: &'a Theme,
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.tabs.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " No open editors",
                self.theme.muted_style(),
            )))
            .style(self.theme.panel_style())
            .render(area, buf);
            return;
        }
        let mut spans = Vec::with_capacity(self.tabs.len() * 2);
        for file in &self.tabs {
            let active = Some(file.id) == self.active;
            spans.push(Span::styled(tab_label(file), self.theme.tab_style(active)));
            spans.push(Span::styled(" ", self.theme.panel_style()));
        }
        Paragraph::new(Line::from(spans))
            .style(self.theme.panel_style())
            .render(area, buf);
    }
}
