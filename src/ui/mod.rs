//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No filesystem I/O happens here.

pub mod editor;
pub mod explorer;
pub mod extensions;
pub mod layout;
pub mod popup;
pub mod search;
pub mod tabs;
pub mod terminal;
pub mod theme;
