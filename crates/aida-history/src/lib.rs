//! Chat session persistence for AiDA
//!
//! Messages are appended to a SQLite log keyed by session id. Sessions can
//! be exported to and imported from pretty JSON files.

mod config;
mod store;

pub use config::HistoryConfig;
pub use store::{SessionExport, SessionStore};

// Re-export core types for convenience
pub use aida_core::{Error, Message, Result, Role};
