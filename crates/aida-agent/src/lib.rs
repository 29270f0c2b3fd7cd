//! The AiDA agent
//!
//! An [`Agent`] drives one user turn as a small state machine: ask the LLM,
//! run every tool it requested, feed the results back, and repeat until the
//! LLM answers without tool calls or the iteration cap is reached.

mod agent;
mod config;
mod detect;
mod observer;
mod profile;
mod prompt;


pub use agent::{Agent, TurnOutcome, ITERATION_LIMIT_MESSAGE};
pub use config::{AgentConfig, IterationLimitPolicy};
pub use detect::{detect_document_query, DocumentQuery};
pub use observer::{AgentObserver, NoopObserver};
pub use profile::AgentProfile;
pub use prompt::{PROMPT_V01, PROMPT_V011};

// Re-export core types for convenience
pub use aida_core::{Error, LLMProvider, Message, Result, Role, ToolCall};
