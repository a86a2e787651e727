//! User configuration: keybindings, editor preferences and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/codeshell/config.toml` (default `~/.config/codeshell/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.  These work from every pane; keys that are
/// not bound here go to the focused pane (editor, terminal, sidebar input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SaveFile,
    SaveAs,
    CloseTab,
    NextTab,
    PrevTab,
    ToggleSidebar,
    ShowExplorer,
    ShowSearch,
    ShowExtensions,
    ToggleTerminal,
    NewTerminal,
    NewFile,
    NewFolder,
    CycleFocus,
    CycleTheme,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::SaveFile,
        Action::SaveAs,
        Action::CloseTab,
        Action::NextTab,
        Action::PrevTab,
        Action::ToggleSidebar,
        Action::ShowExplorer,
        Action::ShowSearch,
        Action::ShowExtensions,
        Action::ToggleTerminal,
        Action::NewTerminal,
        Action::NewFile,
        Action::NewFolder,
        Action::CycleFocus,
        Action::CycleTheme,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::SaveFile => "Save",
            Action::SaveAs => "Save As…",
            Action::CloseTab => "Close Tab",
            Action::NextTab => "Next Tab",
            Action::PrevTab => "Previous Tab",
            Action::ToggleSidebar => "Toggle Sidebar",
            Action::ShowExplorer => "Explorer",
            Action::ShowSearch => "Search",
            Action::ShowExtensions => "Extensions",
            Action::ToggleTerminal => "Toggle Terminal",
            Action::NewTerminal => "New Terminal",
            Action::NewFile => "New File",
            Action::NewFolder => "New Folder",
            Action::CycleFocus => "Cycle Focus",
            Action::CycleTheme => "Cycle Theme",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::SaveFile => "save",
            Action::SaveAs => "save_as",
            Action::CloseTab => "close_tab",
            Action::NextTab => "next_tab",
            Action::PrevTab => "prev_tab",
            Action::ToggleSidebar => "toggle_sidebar",
            Action::ShowExplorer => "show_explorer",
            Action::ShowSearch => "show_search",
            Action::ShowExtensions => "show_extensions",
            Action::ToggleTerminal => "toggle_terminal",
            Action::NewTerminal => "new_terminal",
            Action::NewFile => "new_file",
            Action::NewFolder => "new_folder",
            Action::CycleFocus => "cycle_focus",
            Action::CycleTheme => "cycle_theme",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── theme ─────────────

/// Colour theme handed to every widget, including the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl ThemeKind {
    pub const ALL: &[ThemeKind] = &[ThemeKind::Dark, ThemeKind::Light, ThemeKind::HighContrast];

    pub fn label(self) -> &'static str {
        match self {
            ThemeKind::Dark => "Dark",
            ThemeKind::Light => "Light",
            ThemeKind::HighContrast => "High Contrast",
        }
    }

    /// Tag used in the config file and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            ThemeKind::Dark => "vs-dark",
            ThemeKind::Light => "vs-light",
            ThemeKind::HighContrast => "hc-black",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vs-dark" | "dark" => Some(ThemeKind::Dark),
            "vs-light" | "light" => Some(ThemeKind::Light),
            "hc-black" | "high-contrast" | "hc" => Some(ThemeKind::HighContrast),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

// ───────────────────────────────────────── key bind ──────────

/// Named keys: (code, name in the config file, label in the UI).
const NAMED_KEYS: &[(KeyCode, &str, &str)] = &[
    (KeyCode::Char(' '), "Space", "Space"),
    (KeyCode::Up, "Up", "↑"),
    (KeyCode::Down, "Down", "↓"),
    (KeyCode::Left, "Left", "←"),
    (KeyCode::Right, "Right", "→"),
    (KeyCode::Enter, "Enter", "Enter"),
    (KeyCode::Esc, "Esc", "Esc"),
    (KeyCode::Tab, "Tab", "Tab"),
    (KeyCode::Backspace, "Backspace", "Bksp"),
    (KeyCode::Delete, "Delete", "Del"),
    (KeyCode::Home, "Home", "Home"),
    (KeyCode::End, "End", "End"),
    (KeyCode::PageUp, "PageUp", "PgUp"),
    (KeyCode::PageDown, "PageDown", "PgDn"),
];

/// Accepted spellings besides the names in `NAMED_KEYS`.
const KEY_ALIASES: &[(&str, KeyCode)] = &[
    ("return", KeyCode::Enter),
    ("escape", KeyCode::Esc),
    ("bksp", KeyCode::Backspace),
    ("del", KeyCode::Delete),
    ("pgup", KeyCode::PageUp),
    ("pgdn", KeyCode::PageDown),
];

const MODIFIERS: &[(KeyModifiers, &str)] = &[
    (KeyModifiers::CONTROL, "Ctrl"),
    (KeyModifiers::ALT, "Alt"),
    (KeyModifiers::SHIFT, "Shift"),
];

fn modifier_mask() -> KeyModifiers {
    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT
}

/// One key plus its Ctrl/Alt/Shift modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Compares code and Ctrl/Alt/Shift; SUPER, HYPER and META are ignored.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && self.modifiers & modifier_mask() == event.modifiers & modifier_mask()
    }

    pub fn from_key_event(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers & modifier_mask())
    }

    /// Label for popups and the status bar, e.g. `Alt+↑`.
    pub fn display(&self) -> String {
        self.render(|name, label| label.unwrap_or(name).to_string())
    }

    /// Spelling written to the config file, e.g. `Alt+Up`.
    fn to_config_string(&self) -> String {
        self.render(|name, _| name.to_string())
    }

    fn render(&self, pick: impl Fn(&str, Option<&str>) -> String) -> String {
        let mut out: String = MODIFIERS
            .iter()
            .filter(|(m, _)| self.modifiers.contains(*m))
            .map(|(_, name)| format!("{name}+"))
            .collect();
        let key = match NAMED_KEYS.iter().find(|(code, _, _)| *code == self.code) {
            Some((_, name, label)) => pick(*name, Some(*label)),
            None => match self.code {
                KeyCode::Char(c) => c.to_string(),
                KeyCode::F(n) => format!("F{n}"),
                other => format!("{other:?}"),
            },
        };
        out.push_str(&key);
        out
    }

    /// Parse `Ctrl+c`, `Alt+Up`, `F6`, `q`.  Case-insensitive except for
    /// single characters.
    fn parse(s: &str) -> Option<Self> {
        let (prefix, key) = match s.rsplit_once('+') {
            // `Ctrl++` binds the plus key.
            Some((p, "")) => (p.strip_suffix('+').unwrap_or(p), "+"),
            Some((p, k)) => (p, k),
            None => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            let (m, _) = MODIFIERS
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(part))?;
            modifiers |= *m;
        }

        let lower = key.to_ascii_lowercase();
        let named = NAMED_KEYS
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(key))
            .map(|(code, _, _)| *code)
            .or_else(|| KEY_ALIASES.iter().find(|(a, _)| *a == lower).map(|(_, c)| *c));

        let code = match named {
            Some(code) => code,
            None => {
                let mut chars = key.chars();
                match (chars.next()?, chars.as_str()) {
                    (c, "") => KeyCode::Char(c),
                    ('f' | 'F', n) => KeyCode::F(n.parse().ok()?),
                    _ => return None,
                }
            }
        };
        Some(Self { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_TAB_WIDTH: u8 = 4;
const DEFAULT_USER: &str = "developer";

/// Application configuration: keybindings and editor preferences.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub theme: ThemeKind,
    /// Quiet period after the last keystroke before search re-runs.
    pub search_debounce_ms: u64,
    /// Tab width of the editor widget.
    pub tab_width: u8,
    /// User name shown in terminal prompts and by `whoami`.
    pub terminal_user: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            theme: ThemeKind::default(),
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            tab_width: DEFAULT_TAB_WIDTH,
            terminal_user: DEFAULT_USER.to_string(),
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let ctrl = KeyModifiers::CONTROL;
        let alt = KeyModifiers::ALT;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(SaveFile, vec![KeyBind::new(Char('s'), ctrl)]);
        m.insert(SaveAs, vec![KeyBind::new(Char('s'), alt)]);
        m.insert(CloseTab, vec![KeyBind::new(Char('w'), ctrl)]);
        m.insert(NextTab, vec![KeyBind::new(PageDown, ctrl), KeyBind::new(Right, alt)]);
        m.insert(PrevTab, vec![KeyBind::new(PageUp, ctrl), KeyBind::new(Left, alt)]);
        m.insert(ToggleSidebar, vec![KeyBind::new(Char('b'), ctrl)]);
        m.insert(ShowExplorer, vec![KeyBind::new(Char('e'), alt)]);
        m.insert(ShowSearch, vec![KeyBind::new(Char('f'), alt)]);
        m.insert(ShowExtensions, vec![KeyBind::new(Char('x'), alt)]);
        m.insert(ToggleTerminal, vec![KeyBind::new(Char('t'), ctrl)]);
        m.insert(NewTerminal, vec![KeyBind::new(Char('t'), alt)]);
        m.insert(NewFile, vec![KeyBind::new(Char('n'), alt)]);
        m.insert(NewFolder, vec![KeyBind::new(Char('d'), alt)]);
        m.insert(CycleFocus, vec![KeyBind::new(F(6), n)]);
        m.insert(CycleTheme, vec![KeyBind::new(Char('k'), alt)]);
        m.insert(OpenSettings, vec![KeyBind::new(F(1), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), ctrl)]);

        m
    }

    /// Action bound to `event`.  If several bindings match, the one with
    /// more modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Add a binding for `action`.  Removes this key from any other action
    /// to prevent conflicts, then appends it to `action`'s bindings.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for (_, binds) in self.bindings.iter_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    /// Restore all bindings to the built-in defaults.
    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"Ctrl+PgDn/Alt+→"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    pub fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: save | {}: focus | {}: terminal | {}: settings | {}: quit",
            self.short_binding(Action::SaveFile),
            self.short_binding(Action::CycleFocus),
            self.short_binding(Action::ToggleTerminal),
            self.short_binding(Action::OpenSettings),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("cannot read {}: {e}", path.display());
                }
                Self::default()
            }
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    /// Save, logging instead of failing.  Used from settings callbacks.
    pub fn save_or_log(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("failed to save config: {e:#}");
        }
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Editor settings.
            match key {
                "theme" => {
                    if let Some(t) = ThemeKind::from_tag(value.trim_matches('"')) {
                        config.theme = t;
                    }
                    continue;
                }
                "search_debounce_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.search_debounce_ms = v.clamp(50, 2000);
                    }
                    continue;
                }
                "tab_width" => {
                    if let Ok(v) = value.parse::<u8>() {
                        config.tab_width = v.clamp(1, 16);
                    }
                    continue;
                }
                "terminal_user" => {
                    let v = value.trim_matches('"');
                    if !v.is_empty() {
                        config.terminal_user = v.to_string();
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let mut parsed = Vec::new();
            for part in value.split(',') {
                let part = part.trim().trim_matches('"');
                if let Some(bind) = KeyBind::parse(part) {
                    parsed.push(bind);
                }
            }
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# codeshell configuration".to_string(),
            String::new(),
            "# Editor settings".to_string(),
            format!("theme = {}", self.theme.tag()),
            format!("search_debounce_ms = {}", self.search_debounce_ms),
            format!("tab_width = {}", self.tab_width),
            format!("terminal_user = {}", self.terminal_user),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/codeshell/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_strings() {
        let b = KeyBind::parse("Ctrl+PageDown").unwrap();
        assert_eq!(b, KeyBind::new(KeyCode::PageDown, KeyModifiers::CONTROL));
        let b = KeyBind::parse("alt+x").unwrap();
        assert_eq!(b, KeyBind::new(KeyCode::Char('x'), KeyModifiers::ALT));
        assert_eq!(KeyBind::parse("F6").unwrap().code, KeyCode::F(6));
        assert!(KeyBind::parse("Hyper+x").is_none());
        assert!(KeyBind::parse("Ctrl+xyz").is_none());
    }

    #[test]
    fn plus_key_and_aliases() {
        let plus = KeyBind::parse("Ctrl++").unwrap();
        assert_eq!(plus, KeyBind::new(KeyCode::Char('+'), KeyModifiers::CONTROL));
        assert_eq!(plus.to_config_string(), "Ctrl++");
        assert_eq!(KeyBind::parse("pgdn").unwrap().code, KeyCode::PageDown);
        let up = KeyBind::new(KeyCode::Up, KeyModifiers::ALT);
        assert_eq!(up.display(), "Alt+↑");
        assert_eq!(up.to_config_string(), "Alt+Up");
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig {
            theme: ThemeKind::Light,
            search_debounce_ms: 150,
            tab_width: 2,
            terminal_user: "ada".into(),
            ..AppConfig::default()
        };
        config.add_binding(Action::Quit, KeyBind::new(KeyCode::Char('x'), KeyModifiers::CONTROL));

        let parsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(parsed.theme, ThemeKind::Light);
        assert_eq!(parsed.search_debounce_ms, 150);
        assert_eq!(parsed.tab_width, 2);
        assert_eq!(parsed.terminal_user, "ada");
        for &action in Action::ALL {
            assert_eq!(parsed.bindings.get(&action), config.bindings.get(&action));
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let parsed = AppConfig::parse_config("search_debounce_ms = 1\ntab_width = 99\ntheme = neon\n");
        assert_eq!(parsed.search_debounce_ms, 50);
        assert_eq!(parsed.tab_width, 16);
        assert_eq!(parsed.theme, ThemeKind::Dark);
    }

    #[test]
    fn rebinding_removes_conflicts() {
        let mut config = AppConfig::default();
        let ctrl_s = KeyBind::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        config.add_binding(Action::Quit, ctrl_s.clone());
        let event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(config.match_key(event), Some(Action::Quit));
        assert_eq!(config.display_bindings(Action::SaveFile), "unbound");
    }

    #[test]
    fn theme_cycles_through_all() {
        let mut t = ThemeKind::Dark;
        for _ in 0..ThemeKind::ALL.len() {
            t = t.next();
        }
        assert_eq!(t, ThemeKind::Dark);
        assert_eq!(ThemeKind::from_tag("hc-black"), Some(ThemeKind::HighContrast));
    }
}
