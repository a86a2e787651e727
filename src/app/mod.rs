//! Application orchestration: state management, event loop, and input handling.

pub mod event;
pub mod handler;
pub mod io_runtime;
pub mod settings;
pub mod state;
