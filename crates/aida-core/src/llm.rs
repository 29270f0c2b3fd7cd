//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::message::{Message, ToolSpec};
use crate::Result;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Groq cloud (OpenAI-compatible API)
    Groq,
    /// Local models served by Ollama
    Ollama,
    /// Azure OpenAI deployments
    Azure,
}

impl ProviderKind {
    /// Get the display name for this provider
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "Groq",
            ProviderKind::Ollama => "Ollama",
            ProviderKind::Azure => "Azure OpenAI",
        }
    }

    /// Get all supported providers
    pub fn all() -> Vec<ProviderKind> {
        vec![ProviderKind::Groq, ProviderKind::Ollama, ProviderKind::Azure]
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<ProviderKind> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Some(ProviderKind::Groq),
            "ollama" => Some(ProviderKind::Ollama),
            "azure" | "azure-openai" | "azureopenai" => Some(ProviderKind::Azure),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for chat generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "llama-3.3-70b-versatile".to_string(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Trait for tool-calling chat models (e.g., Groq, Ollama, Azure OpenAI)
///
/// A provider receives the full conversation, including the system prompt,
/// together with the tools the model may call. It answers with a single AI
/// message which either carries the final text or one or more tool calls.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one chat completion
    async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;

    /// Which backend serves this provider
    fn kind(&self) -> ProviderKind;
}
