//! Search sidebar widget (query and replace inputs, option toggles, and
//! results grouped by file).

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::core::search::{FileMatches, SearchOptions};
use crate::ui::theme::Theme;

/// Rows of the panel above the result list.
pub const HEADER_ROWS: u16 = 4;

/// Which text input receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Query,
    Replace,
}

/// One row of the flattened result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRow {
    /// File header: index into the results.
    File(usize),
    /// Single match: (file index, match index).
    Match(usize, usize),
}

/// Flatten grouped results into display rows.
pub fn search_rows(results: &[FileMatches]) -> Vec<SearchRow> {
    let mut rows = Vec::new();
    for (fi, file) in results.iter().enumerate() {
        rows.push(SearchRow::File(fi));
        rows.extend((0..file.matches.len()).map(|mi| SearchRow::Match(fi, mi)));
    }
    rows
}

pub struct SearchWidget<'a> {
    pub block: Block<'a>,
    pub theme: &'a Theme,
    pub query: &'a str,
    pub replacement: &'a str,
    pub options: SearchOptions,
    /// Focused input, `None` while the sidebar is not focused.
    pub field: Option<SearchField>,
    pub results: &'a [FileMatches],
    pub selected: Option<usize>,
    /// `true` while a debounced search is pending.
    pub pending: bool,
}

impl<'a> Widget for SearchWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.block.inner(area);
        self.block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let mut y = inner.y;
        let bottom = inner.y + inner.height;
        let mut put = |line: Line, y: &mut u16| -> bool {
            if *y >= bottom {
                return false;
            }
            Paragraph::new(line).render(Rect::new(inner.x, *y, inner.width, 1), buf);
            *y += 1;
            *y < bottom
        };

        let input = |label: &'static str, value: &str, focused: bool| {
            let marker = if focused { "▸ " } else { "  " };
            let label_style = if focused {
                self.theme.title_style()
            } else {
                self.theme.muted_style()
            };
            Line::from(vec![
                Span::styled(format!("{marker}{label}"), label_style),
                Span::styled(value.to_string(), self.theme.input_style()),
            ])
        };

        if !put(
            input("Search:  ", self.query, self.field == Some(SearchField::Query)),
            &mut y,
        ) {
            return;
        }
        if !put(
            input(
                "Replace: ",
                self.replacement,
                self.field == Some(SearchField::Replace),
            ),
            &mut y,
        ) {
            return;
        }

        let toggle = |text: &'static str, on: bool| Span::styled(text, self.theme.toggle_style(on));
        if !put(
            Line::from(vec![
                Span::raw("  "),
                toggle("Aa", self.options.case_sensitive),
                Span::raw(" "),
                toggle("ab", self.options.whole_word),
                Span::raw(" "),
                toggle(".*", self.options.use_regex),
                Span::raw(" "),
                toggle("aA", self.options.preserve_case),
                Span::styled("  Alt+c/w/r/p", self.theme.muted_style()),
            ]),
            &mut y,
        ) {
            return;
        }

        let match_count: usize = self.results.iter().map(|f| f.matches.len()).sum();
        let summary = if self.pending {
            "  Searching…".to_string()
        } else if self.query.is_empty() {
            "  Type to search.".to_string()
        } else if match_count == 0 {
            "  No results.".to_string()
        } else {
            format!(
                "  {match_count} result{} in {} file{}",
                plural(match_count),
                self.results.len(),
                plural(self.results.len())
            )
        };
        if !put(
            Line::from(Span::styled(summary, self.theme.muted_style())),
            &mut y,
        ) {
            return;
        }

        let rows = search_rows(self.results);
        let height = bottom.saturating_sub(y) as usize;
        let selected = self.selected.unwrap_or(0);
        let offset = result_offset(selected, height);

        for (row_idx, row) in rows.iter().enumerate().skip(offset).take(height) {
            let is_selected = self.selected == Some(row_idx);
            let line = match *row {
                SearchRow::File(fi) => {
                    let file = &self.results[fi];
                    let style = if is_selected {
                        self.theme.selected_style()
                    } else {
                        self.theme.folder_style()
                    };
                    Line::from(vec![
                        Span::styled(file.path.clone(), style),
                        Span::styled(
                            format!(" ({})", file.matches.len()),
                            self.theme.muted_style(),
                        ),
                    ])
                }
                SearchRow::Match(fi, mi) => {
                    let m = &self.results[fi].matches[mi];
                    let base = if is_selected {
                        self.theme.selected_style()
                    } else {
                        self.theme.file_style()
                    };
                    match_line(m.line, &m.text, m.offset, m.length, base, self.theme.match_style())
                }
            };
            put(line, &mut y);
        }
    }
}

/// First result row shown when `selected` must be visible in `height` rows.
pub fn result_offset(selected: usize, height: usize) -> usize {
    if height > 0 && selected >= height {
        selected + 1 - height
    } else {
        0
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `  12: before[match]after`, with leading whitespace trimmed and the match
/// highlighted.  `offset`/`length` are in characters.
fn match_line(
    line_no: usize,
    text: &str,
    offset: usize,
    length: usize,
    base: Style,
    highlight: Style,
) -> Line<'static> {
    let indent = text.chars().take_while(|c| c.is_whitespace()).count().min(offset);
    let chars: Vec<char> = text.chars().collect();
    let end = (offset + length).min(chars.len());
    let before: String = chars[indent..offset.min(chars.len())].iter().collect();
    let hit: String = chars[offset.min(chars.len())..end].iter().collect();
    let after: String = chars[end..].iter().collect();
    Line::from(vec![
        Span::styled(format!("  {line_no}: "), base),
        Span::styled(before, base),
        Span::styled(hit, base.patch(highlight)),
        Span::styled(after, base),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::LineMatch;

    fn file(path: &str, n: usize) -> FileMatches {
        FileMatches {
            node: 0,
            path: path.to_string(),
            matches: (0..n)
                .map(|i| LineMatch {
                    line: i + 1,
                    offset: 0,
                    length: 1,
                    text: "x".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn rows_interleave_headers_and_matches() {
        let rows = search_rows(&[file("a.js", 2), file("b.js", 1)]);
        assert_eq!(
            rows,
            vec![
                SearchRow::File(0),
                SearchRow::Match(0, 0),
                SearchRow::Match(0, 1),
                SearchRow::File(1),
                SearchRow::Match(1, 0),
            ]
        );
    }

    #[test]
    fn match_line_trims_indent_and_splits_hit() {
        let line = match_line(3, "    let x = 1;", 8, 1, Style::default(), Style::default());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "  3: let x = 1;");
        assert_eq!(line.spans[2].content, "x");
    }
}
