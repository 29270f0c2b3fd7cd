//! Native Ollama chat client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

use aida_core::{
    Error, GenerationConfig, LLMProvider, Message, ProviderKind, Result, Role, ToolCall, ToolSpec,
};

use crate::config::LlmConfig;

/// Chat client for a local Ollama server
pub struct OllamaClient {
    host: String,
    generation: GenerationConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OllamaMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<OllamaToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OllamaToolCall {
    pub function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OllamaFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaChatResponse {
    pub message: OllamaMessage,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            host: config.base_url.trim_end_matches('/').to_string(),
            generation: config.generation_config(),
            client,
        })
    }

    async fn perform_chat(&self, request: &OllamaChatRequest) -> Result<Message> {
        let url = format!("{}/api/chat", self.host);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                Error::Network(format!("Could not reach Ollama at {}: {}", self.host, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LLMProvider(format!(
                "Ollama request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMProvider(format!("Failed to parse response: {}", e)))?;

        Ok(from_ollama(body.message))
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message> {
        let request = build_ollama_request(messages, tools, &self.generation);

        tracing::debug!(
            host = %self.host,
            messages = messages.len(),
            tools = tools.len(),
            "sending Ollama chat request"
        );

        timeout(self.generation.timeout, self.perform_chat(&request))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "Ollama did not answer within {}s",
                    self.generation.timeout.as_secs()
                ))
            })?
    }

    fn model_id(&self) -> &str {
        &self.generation.model_id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }
}

pub(crate) fn build_ollama_request(
    messages: &[Message],
    tools: &[ToolSpec],
    generation: &GenerationConfig,
) -> OllamaChatRequest {
    let options = if generation.temperature.is_some() || generation.max_tokens.is_some() {
        Some(OllamaOptions {
            temperature: generation.temperature,
            num_predict: generation.max_tokens,
        })
    } else {
        None
    };

    OllamaChatRequest {
        model: generation.model_id.clone(),
        messages: messages.iter().map(to_ollama).collect(),
        tools: tools
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": spec.name,
                        "description": spec.description,
                        "parameters": spec.parameters,
                    }
                })
            })
            .collect(),
        stream: false,
        options,
    }
}

pub(crate) fn to_ollama(message: &Message) -> OllamaMessage {
    OllamaMessage {
        role: match message.role {
            Role::System => "system",
            Role::Human => "user",
            Role::Ai => "assistant",
            Role::Tool => "tool",
        }
        .to_string(),
        content: message.content.clone(),
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| OllamaToolCall {
                function: OllamaFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect(),
        tool_name: match message.role {
            Role::Tool => message.tool_name.clone(),
            _ => None,
        },
    }
}

/// Ollama does not assign call ids, so one is generated per call
pub(crate) fn from_ollama(message: OllamaMessage) -> Message {
    if message.tool_calls.is_empty() {
        return Message::ai(message.content);
    }

    let calls = message
        .tool_calls
        .into_iter()
        .map(|call| {
            let arguments = match call.function.arguments {
                Value::Null => Value::Object(Default::default()),
                Value::String(raw) => crate::openai_compat::parse_arguments(&raw),
                other => other,
            };
            ToolCall::new(
                format!("call_{}", uuid::Uuid::new_v4().simple()),
                call.function.name,
                arguments,
            )
        })
        .collect();
    Message::ai_with_tool_calls(message.content, calls)
}
