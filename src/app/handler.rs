//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::{Action, KeyBind};
use crate::core::extensions::ExtensionFilter;
use crate::ui::layout::{contains, AppLayout};
use crate::ui::search::SearchField;
use crate::ui::{extensions as extensions_ui, search as search_ui, tabs};

use super::settings::{SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState, Focus, SidebarView};

/// Width of the sidebar block border.
const BORDER: u16 = 1;

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    state.status_message = None;
    match state.active_view {
        ActiveView::Workbench => handle_workbench_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

// ── Workbench (configurable bindings, then per-focus keys) ──────

fn handle_workbench_key(state: &mut AppState, key: KeyEvent) {
    if state.prompt.is_some() {
        handle_prompt_key(state, key);
        return;
    }

    let action = state.config.match_key(key);
    if action != Some(Action::Quit) {
        state.quit_armed = false;
    }
    if let Some(action) = action {
        run_action(state, action);
        return;
    }

    match state.focus {
        Focus::Sidebar => match state.sidebar {
            SidebarView::Explorer => handle_explorer_key(state, key),
            SidebarView::Search => handle_search_key(state, key),
            SidebarView::Extensions => handle_extensions_key(state, key),
        },
        Focus::Editor => {
            if let Some(text) = state.editor.input(key) {
                state.on_editor_change(text);
            }
        }
        Focus::Terminal => handle_terminal_key(state, key),
    }
}

fn run_action(state: &mut AppState, action: Action) {
    tracing::trace!("action {action:?}");
    match action {
        Action::Quit => state.request_quit(),
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::SaveFile => state.save_active(),
        Action::SaveAs => state.begin_save_as(),
        Action::CloseTab => {
            if state.focus == Focus::Terminal {
                state.close_terminal();
            } else {
                state.close_active_tab();
            }
        }
        Action::NextTab | Action::PrevTab => {
            let offset = if action == Action::NextTab { 1 } else { -1 };
            if state.focus == Focus::Terminal {
                state.terminals.cycle(offset);
            } else {
                state.cycle_tab(offset);
            }
        }
        Action::ToggleSidebar => state.toggle_sidebar(),
        Action::ShowExplorer => state.show_view(SidebarView::Explorer),
        Action::ShowSearch => state.show_view(SidebarView::Search),
        Action::ShowExtensions => state.show_view(SidebarView::Extensions),
        Action::ToggleTerminal => state.toggle_terminal(),
        Action::NewTerminal => state.new_terminal(),
        Action::NewFile | Action::NewFolder => {
            state.sidebar = SidebarView::Explorer;
            state.show_sidebar = true;
            state.begin_create(action == Action::NewFolder);
        }
        Action::CycleFocus => state.cycle_focus(),
        Action::CycleTheme => state.cycle_theme(),
    }
}

fn is_text_input(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(c)
        }
        _ => None,
    }
}

// ── Prompt ──────────────────────────────────────────────────────

fn handle_prompt_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => return state.cancel_prompt(),
        KeyCode::Enter => return state.submit_prompt(),
        _ => {}
    }
    let Some(prompt) = state.prompt.as_mut() else {
        return;
    };
    if key.code == KeyCode::Backspace {
        prompt.input.pop();
    } else if let Some(c) = is_text_input(key) {
        prompt.input.push(c);
    } else {
        return;
    }
    prompt.error = None;
}

// ── Explorer ────────────────────────────────────────────────────

fn handle_explorer_key(state: &mut AppState, key: KeyEvent) {
    let visible = state.tree.visible_nodes();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.tree_state.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => state.tree_state.select_next(visible.len()),
        KeyCode::Home => {
            // Root is always the first visible row.
            state.tree_state.selected = 0;
            state.tree_state.offset = 0;
        }
        KeyCode::End => {
            state.tree_state.selected = visible.len().saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(node) = state.selected_node() {
                state.activate_node(node);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let Some(node) = state.selected_node() else {
                return;
            };
            let item = state.tree.get(node);
            if item.is_folder && !item.is_open {
                state.tree.toggle_open(node);
            } else {
                state.tree_state.select_next(visible.len());
            }
        }
        KeyCode::Left | KeyCode::Char('h') => handle_collapse(state),
        KeyCode::Esc => state.focus = Focus::Editor,
        _ => {}
    }
}

/// Collapse an open folder, or move to the parent folder.
fn handle_collapse(state: &mut AppState) {
    let Some(node) = state.selected_node() else {
        return;
    };
    let item = state.tree.get(node);
    if item.is_folder && item.is_open {
        state.tree.toggle_open(node);
    } else if let Some(parent) = item.parent {
        state.tree_state.select_node(&state.tree, parent);
    }
}

// ── Search ──────────────────────────────────────────────────────

fn handle_search_key(state: &mut AppState, key: KeyEvent) {
    let now = std::time::Instant::now();
    if key.modifiers == KeyModifiers::ALT {
        match key.code {
            KeyCode::Char('a') => state.replace_all(),
            KeyCode::Char('1') => state.replace_in_selected_file(),
            KeyCode::Char(c @ ('c' | 'w' | 'r' | 'p')) => {
                let options = &mut state.search.options;
                let flag = match c {
                    'c' => &mut options.case_sensitive,
                    'w' => &mut options.whole_word,
                    'r' => &mut options.use_regex,
                    _ => &mut options.preserve_case,
                };
                *flag = !*flag;
                state.run_search();
            }
            _ => {}
        }
        return;
    }

    let row_count = state.search.rows().len();
    match key.code {
        KeyCode::Esc => state.focus = Focus::Editor,
        KeyCode::Tab | KeyCode::BackTab => {
            state.search.field = match state.search.field {
                SearchField::Query => SearchField::Replace,
                SearchField::Replace => SearchField::Query,
            };
        }
        KeyCode::Up => state.search.selected = state.search.selected.saturating_sub(1),
        KeyCode::Down => {
            if state.search.selected + 1 < row_count {
                state.search.selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.open_selected_result() {
                state.focus = Focus::Editor;
            }
        }
        KeyCode::Backspace => {
            let editing_query = state.search.field == SearchField::Query;
            state.search.field_mut().pop();
            if editing_query {
                state.schedule_search(now);
            }
        }
        _ => {
            if let Some(c) = is_text_input(key) {
                let editing_query = state.search.field == SearchField::Query;
                state.search.field_mut().push(c);
                if editing_query {
                    state.search.selected = 0;
                    state.schedule_search(now);
                }
            }
        }
    }
}

// ── Extensions ──────────────────────────────────────────────────

fn handle_extensions_key(state: &mut AppState, key: KeyEvent) {
    let panel = &mut state.extensions;
    match key.code {
        KeyCode::Esc => state.focus = Focus::Editor,
        KeyCode::Tab | KeyCode::BackTab => {
            panel.filter = match panel.filter {
                ExtensionFilter::Marketplace => ExtensionFilter::Installed,
                ExtensionFilter::Installed => ExtensionFilter::Marketplace,
            };
            panel.selected = 0;
        }
        KeyCode::Up => panel.selected = panel.selected.saturating_sub(1),
        KeyCode::Down => {
            if panel.selected + 1 < panel.visible_count() {
                panel.selected += 1;
            }
        }
        KeyCode::Enter => {
            if let Some((name, installed)) = panel.toggle_selected() {
                let verb = if installed { "Installed" } else { "Uninstalled" };
                state.status_message = Some(format!("{verb} {name}"));
            }
        }
        KeyCode::Backspace => {
            panel.query.pop();
            panel.selected = 0;
        }
        _ => {
            if let Some(c) = is_text_input(key) {
                panel.query.push(c);
                panel.selected = 0;
            }
        }
    }
}

// ── Terminal ────────────────────────────────────────────────────

fn handle_terminal_key(state: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        state.focus = Focus::Editor;
        return;
    }
    if key.code == KeyCode::Enter {
        state.submit_terminal();
        return;
    }
    let Some(term) = state.terminals.active_mut() else {
        return;
    };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => term.interrupt(&state.tree),
        KeyCode::Char('l') if ctrl => term.lines.clear(),
        KeyCode::Backspace => term.backspace(),
        KeyCode::Up => term.history_prev(),
        KeyCode::Down => term.history_next(),
        _ => {
            if let Some(c) = is_text_input(key) {
                term.push_char(c);
            }
        }
    }
}

// ── Paste ───────────────────────────────────────────────────────

/// Bracketed paste goes to whatever currently takes text.
pub fn handle_paste(state: &mut AppState, text: &str) {
    if state.active_view != ActiveView::Workbench {
        return;
    }
    let single_line = || text.chars().filter(|c| !c.is_control());
    if let Some(prompt) = state.prompt.as_mut() {
        prompt.input.extend(single_line());
        return;
    }
    match state.focus {
        Focus::Editor => {
            if let Some(new_text) = state.editor.paste(text) {
                state.on_editor_change(new_text);
            }
        }
        Focus::Terminal => {
            if let Some(term) = state.terminals.active_mut() {
                single_line().for_each(|c| term.push_char(c));
            }
        }
        Focus::Sidebar => match state.sidebar {
            SidebarView::Search => {
                let editing_query = state.search.field == SearchField::Query;
                state.search.field_mut().extend(single_line());
                if editing_query {
                    state.schedule_search(std::time::Instant::now());
                }
            }
            SidebarView::Extensions => state.extensions.query.extend(single_line()),
            SidebarView::Explorer => {}
        },
    }
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Workbench;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                match item {
                    SettingsItem::Submenu { view, .. } => {
                        state.active_view = *view;
                        state.controls_selected = 0;
                    }
                    SettingsItem::Toggle { get, set, .. } => {
                        let current = get(state);
                        set(state, !current);
                    }
                    SettingsItem::Cycle { cycle, .. } => {
                        cycle(state);
                    }
                }
            }
        }
        _ => {}
    }
}

// ── Controls submenu (hardcoded navigation, interactive rebinding) ──

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    let item_count = controls_item_count();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Workbench;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected < item_count - 1 {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                state.config.save_or_log();
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            // Clear all bindings for the selected action.
            if state.controls_selected < Action::ALL.len() {
                let action = Action::ALL[state.controls_selected];
                state.config.bindings.insert(action, Vec::new());
                state.config.save_or_log();
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    // Esc cancels rebinding.
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }

    let action = Action::ALL[state.controls_selected];
    let bind = KeyBind::from_key_event(key);
    state.config.add_binding(action, bind);
    state.config.save_or_log();
    state.awaiting_rebind = false;
}

// ── Mouse ───────────────────────────────────────────────────────

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Workbench || state.prompt.is_some() {
        return;
    }

    let layout = AppLayout::from_area(state.terminal_area, state.show_sidebar, state.show_terminal);
    let (col, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if contains(layout.sidebar_area, col, row) {
                state.focus = Focus::Sidebar;
                handle_sidebar_click(state, layout, row);
            } else if contains(layout.tabs_area, col, row) {
                handle_tab_click(state, col - layout.tabs_area.x);
            } else if contains(layout.editor_area, col, row) {
                state.focus = Focus::Editor;
            } else if contains(layout.terminal_area, col, row) {
                state.focus = Focus::Terminal;
            }
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let down = mouse.kind == MouseEventKind::ScrollDown;
            if contains(layout.sidebar_area, col, row) {
                scroll_sidebar(state, down);
            } else if contains(layout.editor_area, col, row) {
                state.editor.input(mouse);
            }
        }
        _ => {}
    }
}

fn handle_sidebar_click(state: &mut AppState, layout: AppLayout, row: u16) {
    let top = layout.sidebar_area.y + BORDER;
    let bottom = layout.sidebar_area.y + layout.sidebar_area.height.saturating_sub(BORDER);
    if row < top || row >= bottom {
        return;
    }
    let rel = row - top;

    match state.sidebar {
        SidebarView::Explorer => {
            let clicked = rel as usize + state.tree_state.offset;
            let visible = state.tree.visible_nodes();
            if let Some(&node) = visible.get(clicked) {
                state.tree_state.selected = clicked;
                state.activate_node(node);
            }
        }
        SidebarView::Search => {
            if rel < search_ui::HEADER_ROWS {
                state.search.field = if rel == 1 {
                    SearchField::Replace
                } else {
                    SearchField::Query
                };
                return;
            }
            let height = (bottom - top - search_ui::HEADER_ROWS) as usize;
            let offset = search_ui::result_offset(state.search.selected, height);
            let clicked = (rel - search_ui::HEADER_ROWS) as usize + offset;
            if clicked < state.search.rows().len() {
                state.search.selected = clicked;
                state.open_selected_result();
            }
        }
        SidebarView::Extensions => {
            if rel < extensions_ui::HEADER_ROWS {
                return;
            }
            let per_page = ((bottom - top - extensions_ui::HEADER_ROWS) / extensions_ui::ENTRY_ROWS)
                .max(1) as usize;
            let offset = state.extensions.selected.saturating_sub(per_page - 1);
            let clicked =
                ((rel - extensions_ui::HEADER_ROWS) / extensions_ui::ENTRY_ROWS) as usize + offset;
            if clicked < state.extensions.visible_count() {
                state.extensions.selected = clicked;
            }
        }
    }
}

/// Select the clicked tab; a click on its `×`/`●` marker closes it.
fn handle_tab_click(state: &mut AppState, col: u16) {
    let ids: Vec<_> = state.store.open_tabs().to_vec();
    let labels: Vec<String> = ids
        .iter()
        .filter_map(|&id| state.store.get(id))
        .map(tabs::tab_label)
        .collect();
    let Some(idx) = tabs::tab_at(&labels, col) else {
        return;
    };
    let (x, w) = tabs::tab_extents(&labels)[idx];
    let id = ids[idx];
    if col + 2 == x + w {
        state.close_tab(id);
    } else {
        state.select_tab(id);
        state.focus = Focus::Editor;
    }
}

fn scroll_sidebar(state: &mut AppState, down: bool) {
    match state.sidebar {
        SidebarView::Explorer => {
            if down {
                let len = state.tree.visible_nodes().len();
                state.tree_state.select_next(len);
            } else {
                state.tree_state.select_prev();
            }
        }
        SidebarView::Search => {
            let len = state.search.rows().len();
            if down && state.search.selected + 1 < len {
                state.search.selected += 1;
            } else if !down {
                state.search.selected = state.search.selected.saturating_sub(1);
            }
        }
        SidebarView::Extensions => {
            let len = state.extensions.visible_count();
            let ext = &mut state.extensions;
            if down && ext.selected + 1 < len {
                ext.selected += 1;
            } else if !down {
                ext.selected = ext.selected.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::{storage::Storage, store::FileStore, tree::sample_project};
    use ratatui::layout::Rect;

    fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut s = AppState::new(
            sample_project(),
            FileStore::from_files(Vec::new()),
            Storage::new(dir.path().join("files.json")),
            AppConfig::default(),
            tx,
        );
        s.terminal_area = Rect::new(0, 0, 120, 40);
        (s, dir)
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn explorer_enter_opens_file_and_focuses_editor() {
        let (mut s, _dir) = state();
        let readme = s.tree.find_path("README.md").unwrap();
        s.tree_state.select_node(&s.tree, readme);
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.focus, Focus::Editor);
        assert_eq!(s.store.active_file().unwrap().path, "README.md");

        type_str(&mut s, "x");
        assert!(s.store.active_file().unwrap().dirty);
    }

    #[test]
    fn explorer_left_collapses_then_moves_to_parent() {
        let (mut s, _dir) = state();
        let src = s.tree.find_path("src").unwrap();
        s.tree_state.select_node(&s.tree, src);
        press(&mut s, KeyCode::Left);
        assert!(!s.tree.get(src).is_open);
        press(&mut s, KeyCode::Left);
        assert_eq!(s.selected_node(), Some(s.tree.root));
    }

    #[test]
    fn search_typing_is_debounced_and_alt_toggles_rerun() {
        let (mut s, _dir) = state();
        s.show_view(SidebarView::Search);
        type_str(&mut s, "GREET");
        assert!(s.search.deadline.is_some());
        assert!(s.search.results.is_empty());

        handle_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::ALT),
        );
        assert!(s.search.options.case_sensitive);
        assert!(s.search.results.is_empty());
        handle_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::ALT),
        );
        assert!(!s.search.results.is_empty());

        let alt_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::ALT);
        handle_key(&mut s, alt_p);
        assert!(s.search.options.preserve_case);
        handle_key(&mut s, alt_p);
        assert!(!s.search.options.preserve_case);
    }

    #[test]
    fn terminal_runs_commands() {
        let (mut s, _dir) = state();
        s.focus = Focus::Terminal;
        type_str(&mut s, "pwd");
        press(&mut s, KeyCode::Enter);
        let term = s.terminals.active().unwrap();
        assert_eq!(term.history, ["pwd"]);
        assert!(term.input.is_empty());
    }

    #[test]
    fn prompt_captures_keys_before_bindings() {
        let (mut s, _dir) = state();
        s.begin_create(true);
        type_str(&mut s, "lib");
        press(&mut s, KeyCode::Enter);
        assert!(s.prompt.is_none());
        assert!(s.tree.find_path("lib").is_some());
    }

    #[test]
    fn rebinding_adds_a_key() {
        let (mut s, _dir) = state();
        s.active_view = ActiveView::ControlsSubmenu;
        s.controls_selected = Action::ALL
            .iter()
            .position(|a| *a == Action::CycleTheme)
            .unwrap();
        press(&mut s, KeyCode::Enter);
        assert!(s.awaiting_rebind);
        press(&mut s, KeyCode::F(9));
        assert!(!s.awaiting_rebind);
        assert_eq!(
            s.config
                .match_key(KeyEvent::new(KeyCode::F(9), KeyModifiers::NONE)),
            Some(Action::CycleTheme)
        );
    }

    #[test]
    fn tab_click_selects_and_marker_closes() {
        let (mut s, _dir) = state();
        let a = s.open_node(s.tree.find_path("README.md").unwrap()).unwrap();
        let b = s.open_node(s.tree.find_path("package.json").unwrap()).unwrap();
        // " README.md × " spans columns 0..13.
        handle_tab_click(&mut s, 1);
        assert_eq!(s.store.active(), Some(a));
        handle_tab_click(&mut s, 11);
        assert_eq!(s.store.open_tabs(), &[b]);
    }

    #[test]
    fn paste_goes_to_search_query() {
        let (mut s, _dir) = state();
        s.show_view(SidebarView::Search);
        handle_paste(&mut s, "foo\nbar");
        assert_eq!(s.search.query, "foobar");
    }
}
