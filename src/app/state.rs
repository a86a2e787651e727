//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::{
    extensions::{ExtensionFilter, Marketplace},
    file::FileId,
    search::{self, FileMatches, Replaced, SearchOptions},
    storage::Storage,
    store::FileStore,
    terminal::TerminalSessions,
    tree::{FileTree, NodeId},
};
use crate::ui::{
    editor::EditorPane,
    explorer::ExplorerState,
    search::{search_rows, SearchField, SearchRow},
    theme::Theme,
};

use super::io_runtime::{self, IoUpdate};

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Workbench,
    SettingsMenu,
    ControlsSubmenu,
}

/// Region receiving keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Sidebar,
    #[default]
    Editor,
    Terminal,
}

/// Panel shown in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarView {
    #[default]
    Explorer,
    Search,
    Extensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    NewFile { parent: NodeId },
    NewFolder { parent: NodeId },
    SaveAs { file: FileId },
}

/// An open text prompt.
#[derive(Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    pub error: Option<String>,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::NewFile { .. } => "New File",
            PromptKind::NewFolder { .. } => "New Folder",
            PromptKind::SaveAs { .. } => "Save As",
        }
    }
}

/// Search sidebar state.
#[derive(Debug, Default)]
pub struct SearchPanel {
    pub query: String,
    pub replacement: String,
    pub options: SearchOptions,
    pub field: SearchField,
    pub results: Vec<FileMatches>,
    /// Index into the flattened result rows.
    pub selected: usize,
    /// When the debounced search should run.
    pub deadline: Option<Instant>,
}

impl SearchPanel {
    pub fn rows(&self) -> Vec<SearchRow> {
        search_rows(&self.results)
    }

    /// Text of the focused input.
    pub fn field_mut(&mut self) -> &mut String {
        match self.field {
            SearchField::Query => &mut self.query,
            SearchField::Replace => &mut self.replacement,
        }
    }
}

/// Extensions sidebar state.
#[derive(Debug, Default)]
pub struct ExtensionsPanel {
    pub marketplace: Marketplace,
    pub query: String,
    pub filter: ExtensionFilter,
    pub selected: usize,
}

impl ExtensionsPanel {
    pub fn visible_count(&self) -> usize {
        self.marketplace.filter(&self.query, self.filter).len()
    }

    pub fn toggle_selected(&mut self) -> Option<(String, bool)> {
        let id = self
            .marketplace
            .filter(&self.query, self.filter)
            .get(self.selected)
            .map(|e| (e.id, e.name))?;
        let installed = self.marketplace.toggle_install(id.0)?;
        let count = self.visible_count();
        self.selected = self.selected.min(count.saturating_sub(1));
        Some((id.1.to_string(), installed))
    }
}

/// Top-level application state.
pub struct AppState {
    /// The explorer tree.
    pub tree: FileTree,
    /// Widget-level state (selection, scroll).
    pub tree_state: ExplorerState,
    pub store: FileStore,
    pub storage: Storage,
    /// Embedded editing widget for the active tab.
    pub editor: EditorPane,
    pub terminals: TerminalSessions,
    pub search: SearchPanel,
    pub extensions: ExtensionsPanel,
    /// User configuration (bindings, theme, editor settings).
    pub config: AppConfig,
    pub theme: Theme,
    /// Directory imported with `--workspace`, used to pre-fill save-as.
    pub workspace: Option<PathBuf>,
    pub sidebar: SidebarView,
    pub show_sidebar: bool,
    pub show_terminal: bool,
    pub focus: Focus,
    pub prompt: Option<Prompt>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Set after a first Quit with unsaved files; the next Quit exits.
    pub quit_armed: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted item in the controls submenu.
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for the user to press
    /// a key to rebind the action at `controls_selected`.
    pub awaiting_rebind: bool,
    /// Full terminal area, updated every frame for mouse hit-testing.
    pub terminal_area: Rect,
    io_tx: mpsc::UnboundedSender<IoUpdate>,
}

impl AppState {
    pub fn new(
        tree: FileTree,
        store: FileStore,
        storage: Storage,
        config: AppConfig,
        io_tx: mpsc::UnboundedSender<IoUpdate>,
    ) -> Self {
        let mut terminals = TerminalSessions::new();
        terminals.create(&config.terminal_user);
        let mut state = Self {
            tree,
            tree_state: ExplorerState::default(),
            store,
            storage,
            editor: EditorPane::default(),
            terminals,
            search: SearchPanel::default(),
            extensions: ExtensionsPanel::default(),
            theme: Theme::for_kind(config.theme),
            config,
            workspace: None,
            sidebar: SidebarView::default(),
            show_sidebar: true,
            show_terminal: true,
            focus: Focus::Sidebar,
            prompt: None,
            should_quit: false,
            quit_armed: false,
            status_message: None,
            active_view: ActiveView::default(),
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            terminal_area: Rect::default(),
            io_tx,
        };
        state.sync_editor();
        state
    }

    // ── explorer ──────────────────────────────────────────────

    pub fn selected_node(&self) -> Option<NodeId> {
        self.tree
            .visible_nodes()
            .get(self.tree_state.selected)
            .copied()
    }

    /// Enter on an explorer row: folders toggle, files open.
    pub fn activate_node(&mut self, node: NodeId) {
        if self.tree.get(node).is_folder {
            self.tree.toggle_open(node);
        } else if self.open_node(node).is_some() {
            self.focus = Focus::Editor;
        }
    }

    /// Open the leaf `node` in a tab.  Folders are ignored.
    pub fn open_node(&mut self, node: NodeId) -> Option<FileId> {
        let item = self.tree.get(node);
        if item.is_folder {
            return None;
        }
        let content = item.content.clone().unwrap_or_default();
        let path = self.tree.path_of(node);
        let id = self.store.open_path(&path, || content);
        self.sync_editor();
        Some(id)
    }

    /// Tree paths of files with unsaved changes.
    pub fn dirty_paths(&self) -> HashSet<String> {
        self.store
            .files()
            .iter()
            .filter(|f| f.dirty)
            .map(|f| f.path.clone())
            .collect()
    }

    /// Open the new-file / new-folder prompt next to the selection.
    pub fn begin_create(&mut self, folder: bool) {
        let parent = self.selected_node().unwrap_or(self.tree.root);
        let kind = if folder {
            PromptKind::NewFolder { parent }
        } else {
            PromptKind::NewFile { parent }
        };
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
            error: None,
        });
    }

    // ── tabs & editor ─────────────────────────────────────────

    /// Load the active file into the editor when it changed.
    pub fn sync_editor(&mut self) {
        if self.editor.file_id != self.store.active() {
            self.editor.load(
                self.store.active_file(),
                &self.theme,
                self.config.tab_width,
            );
        }
    }

    /// Reload the editor after the active file changed underneath it.
    fn refresh_editor(&mut self) {
        match self.store.active_file() {
            Some(file) if self.editor.file_id == Some(file.id) => {
                self.editor.reload(file, &self.theme, self.config.tab_width);
            }
            file => self.editor.load(file, &self.theme, self.config.tab_width),
        }
    }

    /// The editor reported new text for the loaded file.
    pub fn on_editor_change(&mut self, text: String) {
        let Some(id) = self.editor.file_id else {
            return;
        };
        self.write_back(id, text);
        self.schedule_search(Instant::now());
    }

    /// Store `text` as the content of `id` and mirror it into the tree leaf.
    fn write_back(&mut self, id: FileId, text: String) {
        let Some(path) = self.store.get(id).map(|f| f.path.clone()) else {
            return;
        };
        if let Some(node) = self.tree.find_path(&path) {
            self.tree.get_mut(node).content = Some(text.clone());
        }
        self.store.update_content(id, text);
    }

    pub fn select_tab(&mut self, id: FileId) {
        self.store.open(id);
        self.sync_editor();
    }

    pub fn cycle_tab(&mut self, offset: isize) {
        self.store.cycle_tab(offset);
        self.sync_editor();
    }

    pub fn close_tab(&mut self, id: FileId) {
        self.store.close(id);
        self.sync_editor();
    }

    pub fn close_active_tab(&mut self) {
        if let Some(id) = self.store.active() {
            self.close_tab(id);
        }
    }

    /// Persist the active file to local storage.
    pub fn save_active(&mut self) {
        let Some(id) = self.store.active() else {
            return;
        };
        self.store.mark_saved(id);
        let name = self.store.get(id).map(|f| f.name.clone()).unwrap_or_default();
        if self.persist() {
            self.status_message = Some(format!("Saved {name}"));
        }
    }

    /// Write the whole store.  Returns `false` (and sets a status message)
    /// on failure.
    fn persist(&mut self) -> bool {
        match self.storage.save(self.store.files()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("{e}");
                self.status_message = Some(format!("Save failed: {e}"));
                false
            }
        }
    }

    pub fn begin_save_as(&mut self) {
        let Some(file) = self.store.active_file() else {
            return;
        };
        let target = match &self.workspace {
            Some(root) => root.join(&file.path),
            None => PathBuf::from(&file.path),
        };
        self.prompt = Some(Prompt {
            kind: PromptKind::SaveAs { file: file.id },
            input: target.display().to_string(),
            error: None,
        });
    }

    // ── prompt ────────────────────────────────────────────────

    /// Confirm the open prompt.  Invalid input keeps it open with an error.
    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt.kind {
            PromptKind::NewFile { parent } | PromptKind::NewFolder { parent } => {
                let folder = matches!(prompt.kind, PromptKind::NewFolder { .. });
                match self.tree.create_item(parent, &prompt.input, folder) {
                    Ok(node) => {
                        let path = self.tree.path_of(node);
                        tracing::info!("created {path}");
                        self.tree_state.select_node(&self.tree, node);
                        if !folder {
                            self.open_node(node);
                            self.focus = Focus::Editor;
                        }
                        self.status_message = Some(format!("Created {path}"));
                    }
                    Err(e) => {
                        self.prompt = Some(Prompt {
                            error: Some(e.to_string()),
                            ..prompt
                        });
                    }
                }
            }
            PromptKind::SaveAs { file } => {
                let target = prompt.input.trim();
                if target.is_empty() {
                    self.prompt = Some(Prompt {
                        error: Some("Path must not be empty".to_string()),
                        ..prompt
                    });
                    return;
                }
                let Some(content) = self.store.get(file).map(|f| f.content.clone()) else {
                    return;
                };
                let path = PathBuf::from(target);
                tracing::debug!("exporting file {file} to {}", path.display());
                io_runtime::spawn_export(self.io_tx.clone(), file, path, content);
            }
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Completion of a background write.
    pub fn apply_io(&mut self, update: IoUpdate) {
        match update {
            IoUpdate::Exported {
                file,
                path,
                content,
                result,
            } => match result {
                Ok(()) => {
                    tracing::info!("exported {}", path.display());
                    self.store.mark_saved_as(file, content);
                    if self.persist() {
                        self.status_message = Some(format!("Saved to {}", path.display()));
                    }
                }
                Err(e) => {
                    tracing::error!("export to {} failed: {e}", path.display());
                    self.status_message =
                        Some(format!("Could not write {}: {e}", path.display()));
                }
            },
        }
    }

    // ── search ────────────────────────────────────────────────

    /// (Re)arm the debounce timer.
    pub fn schedule_search(&mut self, now: Instant) {
        if self.search.query.is_empty() && self.search.results.is_empty() {
            self.search.deadline = None;
            return;
        }
        let delay = Duration::from_millis(self.config.search_debounce_ms);
        self.search.deadline = Some(now + delay);
    }

    /// Run the pending search once its deadline has passed.
    pub fn poll_search(&mut self, now: Instant) {
        if self.search.deadline.is_some_and(|d| d <= now) {
            self.run_search();
        }
    }

    pub fn run_search(&mut self) {
        self.search.deadline = None;
        self.search.results = search::search_tree(&self.tree, &self.search.query, self.search.options);
        let rows = self.search.rows().len();
        self.search.selected = self.search.selected.min(rows.saturating_sub(1));
    }

    /// Open the file of the selected result; match rows also move the
    /// editor cursor onto the match.
    pub fn open_selected_result(&mut self) -> bool {
        let rows = self.search.rows();
        let Some(&row) = rows.get(self.search.selected) else {
            return false;
        };
        let (file_idx, target) = match row {
            SearchRow::File(fi) => (fi, None),
            SearchRow::Match(fi, mi) => {
                let m = &self.search.results[fi].matches[mi];
                (fi, Some((m.line - 1, m.offset)))
            }
        };
        let node = self.search.results[file_idx].node;
        if self.open_node(node).is_none() {
            return false;
        }
        self.tree.reveal(node);
        self.tree_state.select_node(&self.tree, node);
        if let Some((row, col)) = target {
            self.editor.jump_to(row, col);
        }
        true
    }

    pub fn replace_all(&mut self) {
        let replaced = search::replace_all(
            &mut self.tree,
            &self.search.query,
            &self.search.replacement,
            self.search.options,
        );
        self.apply_replacements(replaced);
    }

    /// Replace only inside the file of the selected result.
    pub fn replace_in_selected_file(&mut self) {
        let rows = self.search.rows();
        let file_idx = match rows.get(self.search.selected) {
            Some(SearchRow::File(fi)) | Some(SearchRow::Match(fi, _)) => *fi,
            None => return,
        };
        let node = self.search.results[file_idx].node;
        let replaced = search::replace_in_file(
            &mut self.tree,
            node,
            &self.search.query,
            &self.search.replacement,
            self.search.options,
        );
        self.apply_replacements(replaced.into_iter().collect());
    }

    /// Open every replaced file and record its new content as a dirty edit.
    fn apply_replacements(&mut self, replaced: Vec<Replaced>) {
        if replaced.is_empty() {
            self.status_message = Some("Nothing to replace".to_string());
            return;
        }
        let files = replaced.len();
        let mut total = 0;
        for r in replaced {
            total += r.count;
            let previous = r.previous;
            let id = self.store.open_path(&r.path, || previous);
            self.store.update_content(id, r.content);
        }
        self.refresh_editor();
        self.run_search();
        self.status_message = Some(format!(
            "Replaced {total} occurrence{} in {files} file{}",
            if total == 1 { "" } else { "s" },
            if files == 1 { "" } else { "s" },
        ));
    }

    // ── terminal ──────────────────────────────────────────────

    pub fn new_terminal(&mut self) {
        self.terminals.create(&self.config.terminal_user);
        self.show_terminal = true;
        self.focus = Focus::Terminal;
    }

    /// Close the active session; the panel hides once none remain.
    pub fn close_terminal(&mut self) {
        if !self.terminals.close_active() {
            self.show_terminal = false;
            if self.focus == Focus::Terminal {
                self.focus = Focus::Editor;
            }
        }
    }

    /// Focus the terminal panel, or hide it when it already has focus.
    pub fn toggle_terminal(&mut self) {
        if self.show_terminal && self.focus != Focus::Terminal {
            self.focus = Focus::Terminal;
        } else {
            self.set_terminal_visible(!self.show_terminal);
        }
    }

    pub fn set_terminal_visible(&mut self, visible: bool) {
        self.show_terminal = visible;
        if visible {
            if self.terminals.terminals.is_empty() {
                self.terminals.create(&self.config.terminal_user);
            }
            self.focus = Focus::Terminal;
        } else if self.focus == Focus::Terminal {
            self.focus = Focus::Editor;
        }
    }

    /// Run the active terminal's input; `exit` closes the session.
    pub fn submit_terminal(&mut self) {
        let exit = match self.terminals.active_mut() {
            Some(term) => term.submit(&self.tree),
            None => false,
        };
        if exit {
            self.close_terminal();
        }
    }

    // ── chrome ────────────────────────────────────────────────

    /// Show `view` in the sidebar, focusing it.  Selecting the panel that
    /// is already focused hides the sidebar.
    pub fn show_view(&mut self, view: SidebarView) {
        if self.show_sidebar && self.sidebar == view && self.focus == Focus::Sidebar {
            self.show_sidebar = false;
            self.focus = Focus::Editor;
            return;
        }
        self.sidebar = view;
        self.show_sidebar = true;
        self.focus = Focus::Sidebar;
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
        if !self.show_sidebar && self.focus == Focus::Sidebar {
            self.focus = Focus::Editor;
        }
    }

    /// Move focus to the next visible region.
    pub fn cycle_focus(&mut self) {
        let order = [Focus::Sidebar, Focus::Editor, Focus::Terminal];
        let start = order.iter().position(|&f| f == self.focus).unwrap_or(0);
        for step in 1..=order.len() {
            let next = order[(start + step) % order.len()];
            let visible = match next {
                Focus::Sidebar => self.show_sidebar,
                Focus::Editor => true,
                Focus::Terminal => self.show_terminal,
            };
            if visible {
                self.focus = next;
                return;
            }
        }
    }

    pub fn cycle_theme(&mut self) {
        self.config.theme = self.config.theme.next();
        self.apply_theme();
        self.config.save_or_log();
        self.status_message = Some(format!("Theme: {}", self.config.theme.label()));
    }

    /// Re-derive the palette and editor styling from the config.
    pub fn apply_theme(&mut self) {
        self.theme = Theme::for_kind(self.config.theme);
        self.editor.apply_style(&self.theme, self.config.tab_width);
    }

    /// Quit, asking for a second press while files are unsaved.
    pub fn request_quit(&mut self) {
        let dirty = self.store.dirty_count();
        if dirty == 0 || self.quit_armed {
            self.should_quit = true;
            return;
        }
        self.quit_armed = true;
        self.status_message = Some(format!(
            "{dirty} unsaved file{}. Quit again to discard changes.",
            if dirty == 1 { "" } else { "s" }
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::sample_project;

    fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("files.json"));
        let (tx, _rx) = mpsc::unbounded_channel();
        let state = AppState::new(
            sample_project(),
            FileStore::from_files(Vec::new()),
            storage,
            AppConfig::default(),
            tx,
        );
        (state, dir)
    }

    fn node(state: &AppState, path: &str) -> NodeId {
        state.tree.find_path(path).unwrap()
    }

    #[test]
    fn opening_a_file_twice_yields_one_tab() {
        let (mut s, _dir) = state();
        let n = node(&s, "src/index.js");
        let a = s.open_node(n).unwrap();
        let b = s.open_node(n).unwrap();
        assert_eq!(a, b);
        assert_eq!(s.store.open_tabs(), &[a]);
        assert_eq!(s.editor.file_id, Some(a));
    }

    #[test]
    fn closing_last_tab_unloads_editor() {
        let (mut s, _dir) = state();
        let n = node(&s, "README.md");
        s.open_node(n);
        s.close_active_tab();
        assert_eq!(s.store.active(), None);
        assert_eq!(s.editor.file_id, None);
    }

    #[test]
    fn edits_update_store_and_tree() {
        let (mut s, _dir) = state();
        let n = node(&s, "package.json");
        let id = s.open_node(n).unwrap();
        s.on_editor_change("{}".to_string());
        assert!(s.store.get(id).unwrap().dirty);
        assert_eq!(s.tree.get(n).content.as_deref(), Some("{}"));
        assert!(s.dirty_paths().contains("package.json"));
    }

    #[test]
    fn replace_all_opens_files_dirty_and_removes_matches() {
        let (mut s, _dir) = state();
        s.tree.insert_path("a.txt", "foo foo\nfoo".to_string());
        s.search.query = "foo".to_string();
        s.search.replacement = "bar".to_string();
        s.run_search();
        assert!(!s.search.results.is_empty());

        s.replace_all();

        let id = s.store.find_by_path("a.txt").unwrap();
        let file = s.store.get(id).unwrap();
        assert_eq!(file.content, "bar bar\nbar");
        assert!(file.dirty);
        assert!(s.store.open_tabs().contains(&id));
        assert!(s.search.results.is_empty());
        let leaf = s.tree.find_path("a.txt").unwrap();
        assert_eq!(s.tree.get(leaf).content.as_deref(), Some("bar bar\nbar"));
    }

    #[test]
    fn replace_keeps_already_open_file_dirty_against_saved_text() {
        let (mut s, _dir) = state();
        s.tree.insert_path("b.txt", "x1".to_string());
        let id = s.open_node(node(&s, "b.txt")).unwrap();
        s.search.query = "1".to_string();
        s.search.replacement = "2".to_string();
        s.run_search();
        s.search.selected = s
            .search
            .rows()
            .iter()
            .position(|r| matches!(r, SearchRow::File(fi) if s.search.results[*fi].path == "b.txt"))
            .unwrap();
        s.replace_in_selected_file();
        // Other files containing the query are left alone.
        let pkg = s.tree.find_path("package.json").unwrap();
        assert!(s.tree.get(pkg).content.as_deref().unwrap().contains("1.0.0"));
        assert_eq!(s.editor.text(), "x2");
        assert!(s.store.get(id).unwrap().dirty);
    }

    #[test]
    fn search_is_debounced() {
        let (mut s, _dir) = state();
        let t0 = Instant::now();
        s.search.query = "greet".to_string();
        s.schedule_search(t0);
        s.poll_search(t0 + Duration::from_millis(100));
        assert!(s.search.results.is_empty());
        s.poll_search(t0 + Duration::from_millis(300));
        assert!(!s.search.results.is_empty());
        assert!(s.search.deadline.is_none());
    }

    #[test]
    fn retyping_pushes_the_search_deadline_back() {
        let (mut s, _dir) = state();
        let t0 = Instant::now();
        s.search.query = "gre".to_string();
        s.schedule_search(t0);
        s.search.query = "greet".to_string();
        s.schedule_search(t0 + Duration::from_millis(200));

        s.poll_search(t0 + Duration::from_millis(300));
        assert!(s.search.results.is_empty());
        assert!(s.search.deadline.is_some());
        s.poll_search(t0 + Duration::from_millis(500));
        assert!(!s.search.results.is_empty());
    }

    #[test]
    fn regex_replace_all_replaces_exactly_the_listed_matches() {
        let (mut s, _dir) = state();
        s.tree.insert_path("notes.txt", "alpha\nbeta\nalpha\nalphabet\n".to_string());
        s.search.options.use_regex = true;
        s.search.query = "^alpha$".to_string();
        s.search.replacement = "omega".to_string();
        s.run_search();
        let listed: usize = s.search.results.iter().map(|f| f.matches.len()).sum();
        assert_eq!(listed, 2);

        s.replace_all();
        let id = s.store.find_by_path("notes.txt").unwrap();
        assert_eq!(s.store.get(id).unwrap().content, "omega\nbeta\nomega\nalphabet\n");
        assert_eq!(
            s.status_message.as_deref(),
            Some("Replaced 2 occurrences in 1 file")
        );
        assert!(s.search.results.is_empty());

        // Spanning lines: nothing listed, nothing replaced.
        s.search.query = "omega\\nbeta".to_string();
        s.run_search();
        assert!(s.search.results.is_empty());
        s.replace_all();
        assert_eq!(s.status_message.as_deref(), Some("Nothing to replace"));
        assert_eq!(s.store.get(id).unwrap().content, "omega\nbeta\nomega\nalphabet\n");
    }

    #[test]
    fn opening_result_reveals_it_in_the_explorer() {
        let (mut s, _dir) = state();
        s.tree.insert_path("public/deep.txt", "needle".to_string());
        let deep = node(&s, "public/deep.txt");
        assert!(!s.tree.visible_nodes().contains(&deep));

        s.search.query = "needle".to_string();
        s.run_search();
        s.search.selected = s
            .search
            .rows()
            .iter()
            .position(|r| matches!(r, SearchRow::File(fi) if s.search.results[*fi].path == "public/deep.txt"))
            .unwrap();
        assert!(s.open_selected_result());
        assert_eq!(s.tree.visible_nodes()[s.tree_state.selected], deep);
    }

    #[test]
    fn exit_closes_the_terminal_session() {
        let (mut s, _dir) = state();
        s.set_terminal_visible(true);
        assert_eq!(s.terminals.terminals.len(), 1);
        if let Some(term) = s.terminals.active_mut() {
            term.input = "exit".to_string();
        }
        s.submit_terminal();
        assert!(s.terminals.terminals.is_empty());
        assert!(!s.show_terminal);
    }

    #[test]
    fn opening_match_row_moves_cursor() {
        let (mut s, _dir) = state();
        s.tree.insert_path("c.txt", "zero\n  one".to_string());
        s.search.query = "one".to_string();
        s.run_search();
        let rows = s.search.rows();
        let idx = rows
            .iter()
            .position(|r| matches!(r, SearchRow::Match(fi, _) if s.search.results[*fi].path == "c.txt"))
            .unwrap();
        s.search.selected = idx;
        assert!(s.open_selected_result());
        assert_eq!(s.editor.cursor(), (1, 2));
    }

    #[test]
    fn save_persists_only_the_file_list() {
        let (mut s, _dir) = state();
        let src = node(&s, "src");
        let n = node(&s, "src/index.js");
        let id = s.open_node(n).unwrap();
        s.on_editor_change("changed".to_string());
        s.tree.toggle_open(src);
        s.save_active();
        assert!(!s.store.get(id).unwrap().dirty);

        let files = s.storage.load().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "changed");

        // A fresh tree starts with its default open state.
        let fresh = sample_project();
        assert!(fresh.get(fresh.find_path("src").unwrap()).is_open);
    }

    #[test]
    fn create_prompt_validates_names() {
        let (mut s, _dir) = state();
        s.tree_state.selected = 0;
        s.begin_create(false);
        s.prompt.as_mut().unwrap().input = "README.md".to_string();
        s.submit_prompt();
        assert!(s.prompt.as_ref().unwrap().error.is_some());

        s.prompt.as_mut().unwrap().input = "notes.txt".to_string();
        s.submit_prompt();
        assert!(s.prompt.is_none());
        let id = s.store.find_by_path("notes.txt").unwrap();
        assert_eq!(s.store.active(), Some(id));
    }

    #[test]
    fn quit_with_unsaved_files_needs_confirmation() {
        let (mut s, _dir) = state();
        s.open_node(node(&s, "README.md"));
        s.on_editor_change("edited".to_string());
        s.request_quit();
        assert!(!s.should_quit);
        s.request_quit();
        assert!(s.should_quit);
    }

    #[test]
    fn export_result_marks_file_saved() {
        let (mut s, _dir) = state();
        let id = s.open_node(node(&s, "README.md")).unwrap();
        s.on_editor_change("new".to_string());
        s.apply_io(IoUpdate::Exported {
            file: id,
            path: PathBuf::from("/tmp/readme"),
            content: "new".to_string(),
            result: Ok(()),
        });
        assert!(!s.store.get(id).unwrap().dirty);
    }
}
