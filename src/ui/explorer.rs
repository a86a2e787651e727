//! Custom Ratatui widget that renders the explorer [`FileTree`] as an
//! indented, collapsible tree.

use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::tree::{FileTree, NodeId};

use super::theme::Theme;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the explorer widget (selected index, scroll offset).
#[derive(Debug, Default)]
pub struct ExplorerState {
    /// Index into the *visible* flat list that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first visible row).
    pub offset: usize,
}

impl ExplorerState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected row is visible within the viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }

    /// Select the row showing `node`, if it is visible.
    pub fn select_node(&mut self, tree: &FileTree, node: NodeId) {
        if let Some(i) = tree.visible_nodes().iter().position(|&n| n == node) {
            self.selected = i;
        }
    }
}

// ───────────────────────────────────────── widget ────────────

/// The explorer widget itself: created fresh each frame.
pub struct ExplorerWidget<'a> {
    tree: &'a FileTree,
    theme: &'a Theme,
    block: Option<Block<'a>>,
    /// Tree paths of files with unsaved changes.
    dirty: Option<&'a HashSet<String>>,
    /// Tree path of the file shown in the editor.
    active_path: Option<&'a str>,
}

impl<'a> ExplorerWidget<'a> {
    pub fn new(tree: &'a FileTree, theme: &'a Theme) -> Self {
        Self {
            tree,
            theme,
            block: None,
            dirty: None,
            active_path: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn dirty(mut self, dirty: &'a HashSet<String>) -> Self {
        self.dirty = Some(dirty);
        self
    }

    pub fn active_path(mut self, path: Option<&'a str>) -> Self {
        self.active_path = path;
        self
    }
}

impl<'a> StatefulWidget for ExplorerWidget<'a> {
    type State = ExplorerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let rows = self.tree.visible_nodes();
        if state.selected >= rows.len() {
            state.selected = rows.len().saturating_sub(1);
        }
        state.clamp_scroll(inner.height as usize);

        let visible_rows = rows
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(inner.height as usize);

        for (i, (row_idx, &node_id)) in visible_rows.enumerate() {
            let y = inner.y + i as u16;
            let is_selected = row_idx == state.selected;
            let node = self.tree.get(node_id);

            let indent = "  ".repeat(node.depth);
            let icon = if node.is_folder {
                if node.is_open {
                    "▾ "
                } else {
                    "▸ "
                }
            } else {
                "  "
            };
            let label = if node_id == self.tree.root {
                node.name.to_uppercase()
            } else {
                node.name.clone()
            };

            let path = if node.is_folder {
                None
            } else {
                Some(self.tree.path_of(node_id))
            };
            let is_active = path.is_some() && path.as_deref() == self.active_path;
            let is_dirty = path
                .as_ref()
                .zip(self.dirty)
                .is_some_and(|(p, d)| d.contains(p));

            let style = if is_selected {
                self.theme.selected_style()
            } else if node.is_folder {
                self.theme.folder_style()
            } else if is_active {
                self.theme.title_style()
            } else {
                self.theme.file_style()
            };

            let mut spans = vec![Span::raw(indent), Span::styled(format!("{icon}{label}"), style)];
            if is_dirty {
                spans.push(Span::styled(" ●", self.theme.muted_style()));
            }

            buf.set_line(inner.x, y, &Line::from(spans), inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::sample_project;

    #[test]
    fn scroll_follows_selection() {
        let mut state = ExplorerState {
            selected: 12,
            offset: 0,
        };
        state.clamp_scroll(5);
        assert_eq!(state.offset, 8);
        state.selected = 3;
        state.clamp_scroll(5);
        assert_eq!(state.offset, 3);
    }

    #[test]
    fn select_node_finds_visible_row() {
        let tree = sample_project();
        let mut state = ExplorerState::default();
        let readme = tree.find_path("README.md").unwrap();
        state.select_node(&tree, readme);
        assert_eq!(tree.visible_nodes()[state.selected], readme);
    }

    #[test]
    fn renders_root_and_folder_icons() {
        let tree = sample_project();
        let theme = Theme::for_kind(crate::config::ThemeKind::Dark);
        let area = Rect::new(0, 0, 30, 12);
        let mut buf = Buffer::empty(area);
        let mut state = ExplorerState::default();
        ExplorerWidget::new(&tree, &theme).render(area, &mut buf, &mut state);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        };
        assert!(row(0).starts_with("▾ MY-PROJECT"));
        assert!(row(1).starts_with("  ▸ public"));
        assert!(row(2).starts_with("  ▾ src"));
    }
}
