//! Core traits and types for AiDA (AI Document Assistant)
//!
//! This crate defines the fundamental types shared by every other AiDA crate:
//! conversation messages and tool calls, document chunks, and the
//! capability-facing traits for LLM providers, embedding providers and vector
//! stores. Keeping them here lets the agent, the RAG pipeline and the tools be
//! tested against fakes.

pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod message;
pub mod vector_store;

pub use document::{Chunk, IndexingConfig};
pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, LLMProvider, ProviderKind};
pub use message::{Message, Role, ToolCall, ToolSpec};
pub use vector_store::{ScoredChunk, SearchConfig, VectorRecord, VectorStore};
