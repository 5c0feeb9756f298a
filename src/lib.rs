//! Keeps a lazily loaded directory tree in sync with a backend, tracks a
//! multi-selection over its visible rows and plans moves between folders.

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod explorer;
pub mod fs;
pub mod logging;
pub mod selection;
