//! LLM providers for AiDA
//!
//! This crate provides the Groq and Azure OpenAI clients (both speaking the
//! OpenAI chat-completions wire format), the native Ollama client, and the
//! Ollama embedding client.

mod config;
mod embeddings;
mod ollama;
mod openai_compat;

#[cfg(test)]
mod tests;

pub use config::{EmbeddingModelConfig, LlmConfig};
pub use embeddings::OllamaEmbedder;
pub use ollama::OllamaClient;
pub use openai_compat::OpenAiCompatClient;

// Re-export core types for convenience
pub use aida_core::{
    Error, GenerationConfig, LLMProvider, Message, ProviderKind, Result, ToolCall, ToolSpec,
};

/// Build the chat provider selected by the configuration
pub fn build_provider(config: &LlmConfig) -> Result<Box<dyn LLMProvider>> {
    let provider: Box<dyn LLMProvider> = match config.provider {
        ProviderKind::Groq => Box::new(OpenAiCompatClient::groq(config)?),
        ProviderKind::Azure => Box::new(OpenAiCompatClient::azure(config)?),
        ProviderKind::Ollama => Box::new(OllamaClient::new(config)?),
    };
    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        "LLM provider initialised"
    );
    Ok(provider)
}
