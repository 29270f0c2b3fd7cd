//! Tools the AiDA agent can call
//!
//! Each tool is a variant of [`ToolKind`]. A [`ToolRegistry`] turns the LLM's
//! raw [`ToolCall`]s into typed [`ToolInvocation`]s and executes them. Every
//! execution yields a [`ToolOutput`]; failures become error text for the LLM
//! instead of aborting the conversation.

mod config;
mod registry;
mod save;
mod scrape;
mod search;
mod tool;

#[cfg(test)]
mod tests;

pub use config::ToolsConfig;
pub use registry::{ToolOutput, ToolRegistry};
pub use save::save_content;
pub use scrape::{
    format_extract_context, parse_urls, ExtractedPage, HtmlExtractor, PageExtractor, TavilyExtract,
};
pub use search::{format_search_context, DuckDuckGoSearch, SearchBackend, SearchHit, TavilySearch};
pub use tool::{
    DocumentRetrievalArgs, SaveContentArgs, ToolInvocation, ToolKind, UrlInput, WebSearchArgs,
    WebsiteScraperArgs,
};

// Re-export core types for convenience
pub use aida_core::{Error, Result, ToolCall, ToolSpec};
