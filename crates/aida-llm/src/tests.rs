//! Snapshot tests for the provider clients

use insta::{assert_snapshot, assert_yaml_snapshot};
use serde_json::json;

use crate::ollama::{build_ollama_request, from_ollama, OllamaChatResponse};
use crate::openai_compat::{from_wire_response, parse_arguments, to_wire, ChatResponse};
use crate::{GenerationConfig, LlmConfig, Message, OpenAiCompatClient, ProviderKind, ToolCall, ToolSpec};

fn groq_config() -> LlmConfig {
    LlmConfig {
        provider: ProviderKind::Groq,
        model: "llama-3.3-70b-versatile".to_string(),
        api_key: Some("gsk_test".to_string()),
        base_url: "https://api.groq.com/openai/v1".to_string(),
        api_version: None,
        temperature: None,
        timeout_secs: 120,
    }
}

#[test]
fn test_config_snapshot() {
    assert_yaml_snapshot!(groq_config(), @r###"
    provider: groq
    model: llama-3.3-70b-versatile
    api_key: gsk_test
    base_url: "https://api.groq.com/openai/v1"
    api_version: ~
    temperature: ~
    timeout_secs: 120
    "###);
}

#[test]
fn test_groq_endpoint() {
    let client = OpenAiCompatClient::groq(&groq_config()).unwrap();
    assert_eq!(client.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
}

#[test]
fn test_azure_endpoint_uses_deployment() {
    let config = LlmConfig {
        provider: ProviderKind::Azure,
        model: "gpt-4o".to_string(),
        api_key: Some("key".to_string()),
        base_url: "https://example.openai.azure.com/".to_string(),
        api_version: Some("2024-05-01-preview".to_string()),
        temperature: None,
        timeout_secs: 120,
    };
    let client = OpenAiCompatClient::azure(&config).unwrap();
    assert_snapshot!(client.endpoint(), @"https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-05-01-preview");
}

#[test]
fn test_tool_call_message_wire_format() {
    let message = Message::ai_with_tool_calls(
        "",
        vec![ToolCall::new("call_1", "WebSearch", json!({"query": "rust"}))],
    );
    let wire = serde_json::to_string(&to_wire(&message)).unwrap();
    assert_snapshot!(wire, @r#"{"role":"assistant","content":"","tool_calls":[{"id":"call_1","type":"function","function":{"name":"WebSearch","arguments":"{\"query\":\"rust\"}"}}]}"#);
}

#[test]
fn test_tool_result_wire_format() {
    let message = Message::tool("call_1", "WebSearch", "result");
    let wire = serde_json::to_string(&to_wire(&message)).unwrap();
    assert_snapshot!(wire, @r#"{"role":"tool","content":"result","tool_call_id":"call_1","name":"WebSearch"}"#);
}

#[test]
fn test_human_role_maps_to_user() {
    let wire = to_wire(&Message::human("hello"));
    assert_eq!(wire.role, "user");
    assert!(wire.tool_calls.is_empty());
}

#[test]
fn test_parse_response_with_tool_calls() {
    let body: ChatResponse = serde_json::from_value(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {"id": "a", "type": "function", "function": {"name": "WebSearch", "arguments": "{\"query\": \"weather\"}"}},
                    {"id": "b", "type": "function", "function": {"name": "WebScraper", "arguments": "not json"}}
                ]
            }
        }]
    }))
    .unwrap();

    let message = from_wire_response(body).unwrap();
    assert!(message.has_tool_calls());
    assert_eq!(message.content, "");
    assert_eq!(message.tool_calls[0].id, "a");
    assert_eq!(message.tool_calls[0].arguments, json!({"query": "weather"}));
    assert_eq!(message.tool_calls[1].arguments, json!("not json"));
}

#[test]
fn test_parse_response_without_choices_fails() {
    let body: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
    assert!(from_wire_response(body).is_err());
}

#[test]
fn test_empty_arguments_become_object() {
    assert_eq!(parse_arguments("  "), json!({}));
}

#[test]
fn test_unparseable_arguments_replay_verbatim() {
    let arguments = parse_arguments("not json");
    assert_eq!(arguments, json!("not json"));

    let message = Message::ai_with_tool_calls("", vec![ToolCall::new("call_1", "WebSearch", arguments)]);
    let wire = to_wire(&message);
    assert_eq!(wire.tool_calls[0].function.arguments, "not json");

    let message = Message::ai_with_tool_calls(
        "",
        vec![ToolCall::new("call_2", "WebSearch", json!({"query": "rust"}))],
    );
    assert_eq!(to_wire(&message).tool_calls[0].function.arguments, r#"{"query":"rust"}"#);
}

#[test]
fn test_ollama_request_disables_streaming() {
    let generation = GenerationConfig {
        model_id: "qwen2.5:3b".to_string(),
        ..Default::default()
    };
    let tools = vec![ToolSpec {
        name: "WebSearch".to_string(),
        description: "Search the web".to_string(),
        parameters: json!({"type": "object"}),
    }];
    let request = build_ollama_request(&[Message::human("hi")], &tools, &generation);
    let wire = serde_json::to_value(&request).unwrap();
    assert_eq!(
        wire,
        json!({
            "model": "qwen2.5:3b",
            "messages": [{"role": "user", "content": "hi"}],
            "tools": [{
                "type": "function",
                "function": {
                    "name": "WebSearch",
                    "description": "Search the web",
                    "parameters": {"type": "object"}
                }
            }],
            "stream": false
        })
    );
}

#[test]
fn test_ollama_tool_calls_get_generated_ids() {
    let body: OllamaChatResponse = serde_json::from_value(json!({
        "message": {
            "role": "assistant",
            "content": "",
            "tool_calls": [
                {"function": {"name": "WebSearch", "arguments": {"query": "news"}}},
                {"function": {"name": "WebSearch", "arguments": {"query": "sports"}}}
            ]
        }
    }))
    .unwrap();

    let message = from_ollama(body.message);
    assert_eq!(message.tool_calls.len(), 2);
    assert!(message.tool_calls[0].id.starts_with("call_"));
    assert_ne!(message.tool_calls[0].id, message.tool_calls[1].id);
    assert_eq!(message.tool_calls[1].arguments, json!({"query": "sports"}));
}
