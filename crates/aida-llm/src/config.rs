//! Provider configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use aida_core::{Error, GenerationConfig, ProviderKind, Result};

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:3b";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_AZURE_MODEL: &str = "gpt-4o";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-05-01-preview";
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Configuration for the chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub api_version: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration using `DEFAULT_PROVIDER` from the given lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match non_empty(&lookup, "DEFAULT_PROVIDER") {
            Some(name) => ProviderKind::from_str(&name).ok_or_else(|| {
                Error::Configuration(format!(
                    "Unknown DEFAULT_PROVIDER '{}' (expected groq, ollama or azure)",
                    name
                ))
            })?,
            None => ProviderKind::Groq,
        };
        Self::for_provider(provider, lookup)
    }

    /// Create configuration for an explicit provider
    pub fn for_provider<F>(provider: ProviderKind, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let temperature = non_empty(&lookup, "LLM_TEMPERATURE").and_then(|t| t.parse().ok());
        let timeout_secs = non_empty(&lookup, "LLM_TIMEOUT_SECS")
            .and_then(|t| t.parse().ok())
            .unwrap_or(120);

        let config = match provider {
            ProviderKind::Groq => {
                let api_key = non_empty(&lookup, "GROQ_API_KEY").ok_or_else(|| {
                    Error::Configuration("GROQ_API_KEY environment variable not found".to_string())
                })?;
                Self {
                    provider,
                    model: non_empty(&lookup, "GROQ_MODEL_NAME")
                        .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                    api_key: Some(api_key),
                    base_url: non_empty(&lookup, "GROQ_API_URL")
                        .unwrap_or_else(|| DEFAULT_GROQ_URL.to_string()),
                    api_version: None,
                    temperature,
                    timeout_secs,
                }
            }
            ProviderKind::Ollama => Self {
                provider,
                model: non_empty(&lookup, "OLLAMA_MODEL_NAME")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                api_key: None,
                base_url: non_empty(&lookup, "OLLAMA_HOST")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
                api_version: None,
                temperature,
                timeout_secs,
            },
            ProviderKind::Azure => {
                let api_key = non_empty(&lookup, "AZURE_OPENAI_API_KEY").ok_or_else(|| {
                    Error::Configuration(
                        "AZURE_OPENAI_API_KEY environment variable not found".to_string(),
                    )
                })?;
                let endpoint = non_empty(&lookup, "AZURE_OPENAI_ENDPOINT").ok_or_else(|| {
                    Error::Configuration(
                        "AZURE_OPENAI_ENDPOINT environment variable not found".to_string(),
                    )
                })?;
                Self {
                    provider,
                    model: non_empty(&lookup, "AZURE_MODEL_NAME")
                        .unwrap_or_else(|| DEFAULT_AZURE_MODEL.to_string()),
                    api_key: Some(api_key),
                    base_url: endpoint,
                    api_version: Some(
                        non_empty(&lookup, "AZURE_OPENAI_API_VERSION")
                            .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
                    ),
                    temperature,
                    timeout_secs,
                }
            }
        };

        Ok(config)
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generation parameters derived from this configuration
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.model.clone(),
            temperature: self.temperature,
            max_tokens: None,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Configuration for the Ollama embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelConfig {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl EmbeddingModelConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: non_empty(&lookup, "OLLAMA_HOST")
                .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            model: non_empty(&lookup, "OLLAMA_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_EMBEDDING_MODEL.to_string()),
            timeout_secs: non_empty(&lookup, "LLM_TIMEOUT_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
        }
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
