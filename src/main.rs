//! A terminal IDE shell: explorer, tabbed editor, simulated terminal,
//! search/replace and an extensions marketplace.
//!
//! Run the binary to open the built-in sample project, or pass
//! `--workspace DIR` to import a directory from disk.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    io_runtime::IoUpdate,
    state::{ActiveView, AppState, Focus, SidebarView},
};
use crate::config::{Action, AppConfig, ThemeKind};
use crate::core::{
    file::EditorFile,
    storage::Storage,
    store::FileStore,
    tree::{self, FileTree},
    workspace::{self, ImportConfig},
};
use crate::ui::{
    editor::EditorView,
    explorer::ExplorerWidget,
    extensions::ExtensionsWidget,
    layout::AppLayout,
    popup,
    search::SearchWidget,
    tabs::TabBar,
    terminal::TerminalPanel,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version, about = "Terminal IDE shell")]
struct Cli {
    /// Import this directory into the explorer instead of the sample project.
    #[arg(long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Colour theme for this session (vs-dark, vs-light, hc-black).
    #[arg(long, value_name = "NAME", value_parser = parse_theme)]
    theme: Option<ThemeKind>,

    /// Delete the persisted file list before starting.
    #[arg(long)]
    reset_storage: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_theme(s: &str) -> Result<ThemeKind, String> {
    ThemeKind::from_tag(s).ok_or_else(|| {
        let known: Vec<_> = ThemeKind::ALL.iter().map(|t| t.tag()).collect();
        format!("unknown theme '{s}' (expected one of {})", known.join(", "))
    })
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // Only emits when RUST_LOG is set; never pollute stdout.
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

// ───────────────────────────────────────── startup ───────────

/// Explorer tree for this session: the imported workspace or the sample
/// project, with every persisted file merged in.
fn build_tree(cli: &Cli, persisted: &[EditorFile]) -> Result<(FileTree, Option<PathBuf>)> {
    let (mut tree, root) = match &cli.workspace {
        Some(dir) => {
            let root = dir
                .canonicalize()
                .with_context(|| format!("cannot open workspace {}", dir.display()))?;
            let report = workspace::import_dir(&root, &ImportConfig::default())?;
            tracing::info!(
                "imported {} files from {} ({} skipped)",
                report.imported,
                root.display(),
                report.skipped
            );
            (report.tree, Some(root))
        }
        None => (tree::sample_project(), None),
    };
    for file in persisted {
        tree.insert_path(&file.path, file.content.clone());
    }
    Ok((tree, root))
}

fn load_files(storage: &Storage, reset: bool) -> Vec<EditorFile> {
    if reset {
        match storage.clear() {
            Ok(()) => tracing::info!("cleared {}", storage.path().display()),
            Err(e) => tracing::error!("{e}"),
        }
    }
    match storage.load() {
        Ok(files) => {
            tracing::debug!("loaded {} files from {}", files.len(), storage.path().display());
            files
        }
        Err(e) => {
            tracing::warn!("{e}; starting with an empty file list");
            Vec::new()
        }
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut user_config = AppConfig::load();
    if let Some(theme) = cli.theme {
        user_config.theme = theme;
    }
    let storage = Storage::default_location();
    let files = load_files(&storage, cli.reset_storage);
    let (tree, workspace_root) = build_tree(&cli, &files)?;

    let (io_tx, io_rx) = mpsc::unbounded_channel::<IoUpdate>();
    let mut state = AppState::new(tree, FileStore::from_files(files), storage, user_config, io_tx);
    state.workspace = workspace_root;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(
        stderr_handle,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let events = spawn_event_reader(Duration::from_millis(250));
    let result = run(&mut terminal, &mut state, events, io_rx).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

/// Draw, then wait for input, a finished background write or the search
/// debounce timer.
async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
    mut io_rx: mpsc::UnboundedReceiver<IoUpdate>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        let search_deadline = state.search.deadline;
        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Paste(text) => handler::handle_paste(state, &text),
                    AppEvent::Resize | AppEvent::Tick => {}
                }
            }

            Some(update) = io_rx.recv() => state.apply_io(update),

            _ = tokio::time::sleep_until(
                tokio::time::Instant::from_std(search_deadline.unwrap_or_else(Instant::now))
            ), if search_deadline.is_some() => {
                state.poll_search(Instant::now());
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();
    state.terminal_area = area;
    let layout = AppLayout::from_area(area, state.show_sidebar, state.show_terminal);
    let theme = state.theme;

    // ── sidebar ───────────────────────────────────────────────
    if layout.sidebar_area.width > 0 {
        let title = match state.sidebar {
            SidebarView::Explorer => " EXPLORER ",
            SidebarView::Search => " SEARCH ",
            SidebarView::Extensions => " EXTENSIONS ",
        };
        let focused = state.focus == Focus::Sidebar;
        let block = Block::default()
            .title(title)
            .title_style(theme.title_style())
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .style(theme.panel_style());

        match state.sidebar {
            SidebarView::Explorer => {
                let dirty = state.dirty_paths();
                let active = state.store.active_file().map(|f| f.path.as_str());
                let widget = ExplorerWidget::new(&state.tree, &theme)
                    .block(block)
                    .dirty(&dirty)
                    .active_path(active);
                frame.render_stateful_widget(widget, layout.sidebar_area, &mut state.tree_state);
            }
            SidebarView::Search => {
                let has_rows = !state.search.results.is_empty();
                frame.render_widget(
                    SearchWidget {
                        block,
                        theme: &theme,
                        query: &state.search.query,
                        replacement: &state.search.replacement,
                        options: state.search.options,
                        field: focused.then_some(state.search.field),
                        results: &state.search.results,
                        selected: has_rows.then_some(state.search.selected),
                        pending: state.search.deadline.is_some(),
                    },
                    layout.sidebar_area,
                );
            }
            SidebarView::Extensions => {
                let panel = &state.extensions;
                let items = panel.marketplace.filter(&panel.query, panel.filter);
                frame.render_widget(
                    ExtensionsWidget {
                        block,
                        theme: &theme,
                        query: &panel.query,
                        filter: panel.filter,
                        installed: panel.marketplace.installed_count(),
                        items: &items,
                        selected: panel.selected,
                        focused,
                    },
                    layout.sidebar_area,
                );
            }
        }
    }

    // ── tabs & editor ─────────────────────────────────────────
    let open: Vec<_> = state
        .store
        .open_tabs()
        .iter()
        .filter_map(|&id| state.store.get(id))
        .collect();
    frame.render_widget(
        TabBar {
            tabs: open,
            active: state.store.active(),
            theme: &theme,
        },
        layout.tabs_area,
    );

    let shortcuts: Vec<(&'static str, String)> = [
        Action::ShowExplorer,
        Action::ShowSearch,
        Action::ToggleTerminal,
        Action::NewFile,
        Action::OpenSettings,
    ]
    .into_iter()
    .map(|a| (a.label(), state.config.short_binding(a)))
    .collect();
    frame.render_widget(
        EditorView {
            pane: &state.editor,
            file: state.store.active_file(),
            theme: &theme,
            focused: state.focus == Focus::Editor,
            shortcuts: &shortcuts,
        },
        layout.editor_area,
    );

    // ── terminal ──────────────────────────────────────────────
    if layout.terminal_area.height > 0 {
        frame.render_widget(
            TerminalPanel {
                sessions: &state.terminals,
                tree: &state.tree,
                theme: &theme,
                focused: state.focus == Focus::Terminal,
            },
            layout.terminal_area,
        );
    }

    draw_status_bar(frame, state, layout.status_area);

    // ── overlays ──────────────────────────────────────────────
    if let Some(prompt) = &state.prompt {
        frame.render_widget(
            popup::PromptPopup {
                title: prompt.title(),
                input: &prompt.input,
                error: prompt.error.as_deref(),
                theme: &theme,
            },
            area,
        );
    }
    match state.active_view {
        ActiveView::SettingsMenu => {
            frame.render_widget(
                popup::SettingsPopup {
                    selected: state.settings_selected,
                    state: &*state,
                },
                area,
            );
        }
        ActiveView::ControlsSubmenu => {
            frame.render_widget(
                popup::ControlsPopup {
                    config: &state.config,
                    theme: &theme,
                    selected: state.controls_selected,
                    awaiting_rebind: state.awaiting_rebind,
                },
                area,
            );
        }
        ActiveView::Workbench => {}
    }
}

/// Status message (or key hints) on the left; cursor, language, dirty
/// marker and theme on the right.
fn draw_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let style = state.theme.status_bar_style();
    let hint = state.config.status_bar_hint();
    let left = state.status_message.as_deref().unwrap_or(&hint);
    frame.render_widget(
        Paragraph::new(Line::from(Span::raw(format!(" {left}")))).style(style),
        area,
    );

    let mut right = Vec::new();
    if let Some(file) = state.store.active_file() {
        let (row, col) = state.editor.cursor();
        right.push(format!("Ln {}, Col {}", row + 1, col + 1));
        right.push(file.language.clone());
        right.push(if file.dirty { "● modified" } else { "✓ saved" }.to_string());
    }
    right.push(state.config.theme.tag().to_string());
    frame.render_widget(
        Paragraph::new(format!("{}  ", right.join("  ")))
            .alignment(Alignment::Right)
            .style(style),
        area,
    );
}
