//! Terminal interface for AiDA

mod chat;
mod command;
mod observer;
mod render;
mod ui;

#[cfg(test)]
mod tests;

pub use chat::{run_interactive, ChatSession};
pub use command::{default_chat_name, ChatCommand};
pub use observer::CliObserver;
pub use render::render_markdown;
pub use ui::{display_banner, handle_input_with_history, print_help, BannerInfo};

// Re-export core types
pub use aida_core::{Error, Result};
