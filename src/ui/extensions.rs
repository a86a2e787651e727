//! Extensions sidebar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::core::extensions::{format_downloads, Extension, ExtensionFilter};
use crate::ui::theme::Theme;

/// Rows of the panel above the extension list.
pub const HEADER_ROWS: u16 = 3;
/// Rows taken by each extension entry.
pub const ENTRY_ROWS: u16 = 3;

pub struct ExtensionsWidget<'a> {
    pub block: Block<'a>,
    pub theme: &'a Theme,
    pub query: &'a str,
    pub filter: ExtensionFilter,
    /// Shown next to the Installed tab.
    pub installed: usize,
    pub items: &'a [&'a Extension],
    pub selected: usize,
    pub focused: bool,
}

impl<'a> Widget for ExtensionsWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.block.inner(area);
        self.block.render(area, buf);
        if inner.height < HEADER_ROWS {
            return;
        }

        let tab = |label: String, on: bool| {
            if on {
                Span::styled(format!("[{label}]"), self.theme.title_style())
            } else {
                Span::styled(format!(" {label} "), self.theme.muted_style())
            }
        };
        let header = vec![
            Line::from(vec![
                Span::styled(
                    if self.focused { "▸ Search: " } else { "  Search: " },
                    self.theme.muted_style(),
                ),
                Span::styled(self.query.to_string(), self.theme.input_style()),
            ]),
            Line::from(vec![
                Span::raw("  "),
                tab("Marketplace".to_string(), self.filter == ExtensionFilter::Marketplace),
                Span::raw(" "),
                tab(
                    format!("Installed ({})", self.installed),
                    self.filter == ExtensionFilter::Installed,
                ),
                Span::styled("  Tab", self.theme.muted_style()),
            ]),
            Line::raw(""),
        ];
        Paragraph::new(header).render(Rect::new(inner.x, inner.y, inner.width, HEADER_ROWS), buf);

        let list = Rect::new(
            inner.x,
            inner.y + HEADER_ROWS,
            inner.width,
            inner.height - HEADER_ROWS,
        );
        if self.items.is_empty() {
            let empty = match self.filter {
                ExtensionFilter::Installed => "  No installed extensions.",
                ExtensionFilter::Marketplace => "  No extensions found.",
            };
            Paragraph::new(Span::styled(empty, self.theme.muted_style())).render(list, buf);
            return;
        }

        let per_page = (list.height / ENTRY_ROWS).max(1) as usize;
        let offset = self.selected.saturating_sub(per_page - 1);
        for (i, ext) in self.items.iter().enumerate().skip(offset).take(per_page) {
            let y = list.y + ((i - offset) as u16) * ENTRY_ROWS;
            if y >= list.y + list.height {
                break;
            }
            let selected = i == self.selected;
            let name_style = if selected {
                self.theme.selected_style()
            } else {
                self.theme.file_style()
            };
            let badge = if ext.installed {
                Span::styled(" ✓ installed", self.theme.toggle_style(true))
            } else {
                Span::raw("")
            };
            let lines = vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", ext.name), name_style),
                    Span::styled(format!("v{}", ext.version), self.theme.muted_style()),
                    badge,
                ]),
                Line::from(Span::styled(
                    format!(" {}", ext.description),
                    self.theme.muted_style(),
                )),
                Line::from(Span::styled(
                    format!(
                        " {}  ⤓ {}  ★ {:.1}",
                        ext.publisher,
                        format_downloads(ext.downloads),
                        ext.rating
                    ),
                    self.theme.muted_style(),
                )),
            ];
            let height = ENTRY_ROWS.min(list.y + list.height - y);
            Paragraph::new(lines).render(Rect::new(list.x, y, list.width, height), buf);
        }
    }
}
