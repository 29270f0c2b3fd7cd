//! OpenAI chat-completions client used for Groq and Azure OpenAI

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

use aida_core::{
    Error, GenerationConfig, LLMProvider, Message, ProviderKind, Result, Role, ToolCall, ToolSpec,
};

use crate::config::LlmConfig;

/// Chat client for any endpoint speaking the OpenAI chat-completions format
pub struct OpenAiCompatClient {
    kind: ProviderKind,
    endpoint: String,
    auth: Auth,
    generation: GenerationConfig,
    client: Client,
}

enum Auth {
    Bearer(String),
    ApiKeyHeader(String),
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: WireMessage,
}

fn function_type() -> String {
    "function".to_string()
}

impl OpenAiCompatClient {
    /// Create a Groq client
    pub fn groq(config: &LlmConfig) -> Result<Self> {
        let key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Configuration("GROQ_API_KEY is not set".to_string()))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Self::build(ProviderKind::Groq, endpoint, Auth::Bearer(key), config)
    }

    /// Create an Azure OpenAI client; the model name is the deployment name
    pub fn azure(config: &LlmConfig) -> Result<Self> {
        let key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Configuration("AZURE_OPENAI_API_KEY is not set".to_string()))?;
        let version = config
            .api_version
            .as_deref()
            .unwrap_or(crate::config::DEFAULT_AZURE_API_VERSION);
        let endpoint = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.base_url.trim_end_matches('/'),
            config.model,
            version
        );
        Self::build(ProviderKind::Azure, endpoint, Auth::ApiKeyHeader(key), config)
    }

    fn build(kind: ProviderKind, endpoint: String, auth: Auth, config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            kind,
            endpoint,
            auth,
            generation: config.generation_config(),
            client,
        })
    }

    /// Endpoint the client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn perform_chat(&self, request: &ChatRequest) -> Result<Message> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        builder = match &self.auth {
            Auth::Bearer(key) => builder.header("Authorization", format!("Bearer {}", key)),
            Auth::ApiKeyHeader(key) => builder.header("api-key", key),
        };

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(Error::Authentication(format!(
                    "{} rejected the credentials ({}): {}",
                    self.kind, status, error_text
                )));
            }
            return Err(Error::LLMProvider(format!(
                "{} request failed with status {}: {}",
                self.kind, status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMProvider(format!("Failed to parse response: {}", e)))?;

        from_wire_response(body)
    }
}

#[async_trait]
impl LLMProvider for OpenAiCompatClient {
    async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message> {
        // Azure selects the model through the deployment in the URL
        let model = match self.kind {
            ProviderKind::Azure => None,
            _ => Some(self.generation.model_id.clone()),
        };
        let request = build_request(model, messages, tools, &self.generation);

        tracing::debug!(
            provider = %self.kind,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat request"
        );

        timeout(self.generation.timeout, self.perform_chat(&request))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "{} did not answer within {}s",
                    self.kind,
                    self.generation.timeout.as_secs()
                ))
            })?
    }

    fn model_id(&self) -> &str {
        &self.generation.model_id
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }
}

pub(crate) fn build_request(
    model: Option<String>,
    messages: &[Message],
    tools: &[ToolSpec],
    generation: &GenerationConfig,
) -> ChatRequest {
    ChatRequest {
        model,
        messages: messages.iter().map(to_wire).collect(),
        tools: tools.iter().map(to_wire_tool).collect(),
        temperature: generation.temperature,
        max_tokens: generation.max_tokens,
    }
}

pub(crate) fn to_wire(message: &Message) -> WireMessage {
    let role = match message.role {
        Role::System => "system",
        Role::Human => "user",
        Role::Ai => "assistant",
        Role::Tool => "tool",
    };

    WireMessage {
        role: role.to_string(),
        content: Some(message.content.clone()),
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                kind: function_type(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: arguments_to_wire(&call.arguments),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
        name: match message.role {
            Role::Tool => message.tool_name.clone(),
            _ => None,
        },
    }
}

/// Arguments that never parsed are replayed as the text the model sent
fn arguments_to_wire(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn to_wire_tool(spec: &ToolSpec) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunction {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
        },
    }
}

pub(crate) fn from_wire_response(response: ChatResponse) -> Result<Message> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::LLMProvider("No choices in response".to_string()))?;
    Ok(from_wire(choice.message))
}

pub(crate) fn from_wire(message: WireMessage) -> Message {
    let content = message.content.unwrap_or_default();
    if message.tool_calls.is_empty() {
        return Message::ai(content);
    }

    let calls = message
        .tool_calls
        .into_iter()
        .map(|call| ToolCall::new(call.id, call.function.name, parse_arguments(&call.function.arguments)))
        .collect();
    Message::ai_with_tool_calls(content, calls)
}

/// Tool arguments arrive as a JSON-encoded string
pub(crate) fn parse_arguments(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(raw.to_string()))
}
