//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use super::state::{ActiveView, AppState};

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Boolean toggle: reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. }
            | Self::Toggle { label, .. }
            | Self::Cycle { label, .. } => label,
        }
    }
}

/// Next entry of `values` after `current` (wrapping); unknown values restart
/// at `fallback`.
fn next_in<T: Copy + PartialEq>(values: &[T], current: T, fallback: usize) -> T {
    let idx = values.iter().position(|v| *v == current).unwrap_or(fallback);
    values[(idx + 1) % values.len()]
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Cycle {
        label: "Color Theme",
        value: |s| s.config.theme.label().to_string(),
        cycle: |s| s.cycle_theme(),
    },
    SettingsItem::Cycle {
        label: "Search Debounce",
        value: |s| format!("{}ms", s.config.search_debounce_ms),
        cycle: |s| {
            const DELAYS: &[u64] = &[150, 300, 500, 1000];
            s.config.search_debounce_ms = next_in(DELAYS, s.config.search_debounce_ms, 0);
            s.config.save_or_log();
            s.status_message = Some(format!(
                "Search debounce: {}ms",
                s.config.search_debounce_ms
            ));
        },
    },
    SettingsItem::Cycle {
        label: "Tab Width",
        value: |s| s.config.tab_width.to_string(),
        cycle: |s| {
            const WIDTHS: &[u8] = &[2, 4, 8];
            s.config.tab_width = next_in(WIDTHS, s.config.tab_width, 0);
            s.config.save_or_log();
            s.apply_theme();
            s.status_message = Some(format!("Tab width: {}", s.config.tab_width));
        },
    },
    SettingsItem::Toggle {
        label: "Sidebar",
        get: |s| s.show_sidebar,
        set: |s, v| {
            if s.show_sidebar != v {
                s.toggle_sidebar();
            }
        },
    },
    SettingsItem::Toggle {
        label: "Terminal Panel",
        get: |s| s.show_terminal,
        set: |s, v| s.set_terminal_visible(v),
    },
];
