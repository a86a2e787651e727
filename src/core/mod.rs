//! Core model – explorer tree, file store, search/replace, simulated
//! terminal and extensions catalogue.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod extensions;
pub mod file;
pub mod search;
pub mod storage;
pub mod store;
pub mod terminal;
pub mod tree;
pub mod workspace;
