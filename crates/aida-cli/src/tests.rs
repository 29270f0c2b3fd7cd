//! Session-level tests with a scripted LLM

use async_trait::async_trait;
use insta::assert_snapshot;
use serde_json::json;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use url::Url;

use aida_agent::{Agent, AgentConfig, AgentProfile, LLMProvider, Message, NoopObserver, Role, ToolCall};
use aida_core::{ProviderKind, ToolSpec};
use aida_history::SessionStore;
use aida_rag::{DocumentIndexer, HashingEmbedder, IndexingConfig, LocalVectorStore, Retriever, SearchConfig};
use aida_tools::{ExtractedPage, PageExtractor, SearchBackend, SearchHit, ToolRegistry, ToolsConfig};

use crate::{render_markdown, ChatSession, Error, Result};

#[derive(Default)]
struct ScriptedLlm {
    responses: Mutex<VecDeque<Message>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn chat(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<Message> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::LLMProvider("script exhausted".to_string()))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }
}

struct NoWeb;

#[async_trait]
impl SearchBackend for NoWeb {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[async_trait]
impl PageExtractor for NoWeb {
    async fn extract(&self, _urls: &[Url]) -> Result<Vec<ExtractedPage>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

async fn session(dir: &Path, llm: Arc<ScriptedLlm>, profile: AgentProfile) -> ChatSession {
    let store = Arc::new(LocalVectorStore::new(dir.join("vectors")).unwrap());
    let indexer = DocumentIndexer::new(
        store,
        Arc::new(HashingEmbedder::default()),
        IndexingConfig::default(),
    );
    let retriever = Arc::new(Retriever::new(indexer, SearchConfig::default()));
    let tools_config = ToolsConfig {
        output_dir: dir.join("outputs"),
        ..Default::default()
    };
    let tools = ToolRegistry::new(
        profile.tools(),
        retriever,
        Arc::new(NoWeb),
        Arc::new(NoWeb),
        &tools_config,
    );
    let agent = Agent::new(llm, Arc::new(tools), AgentConfig::for_profile(profile));
    let history = SessionStore::open_in_memory().await.unwrap();
    ChatSession::new(agent, history, "test-session", dir.join("chats"))
}

fn scripted(responses: Vec<Message>) -> Arc<ScriptedLlm> {
    Arc::new(ScriptedLlm {
        responses: Mutex::new(responses.into()),
        seen: Mutex::default(),
    })
}

#[tokio::test]
async fn test_follow_up_sees_previous_turn() {
    let dir = TempDir::new().unwrap();
    let llm = scripted(vec![Message::ai("Hi Ada!"), Message::ai("Your name is Ada.")]);
    let session = session(dir.path(), llm.clone(), AgentProfile::V011).await;

    session.send("My name is Ada", &NoopObserver).await.unwrap();
    let outcome = session.send("What is my name?", &NoopObserver).await.unwrap();

    assert_eq!(outcome.answer, "Your name is Ada.");
    let second: Vec<String> = llm.seen.lock().unwrap()[1]
        .iter()
        .skip(1)
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(second, vec!["My name is Ada", "Hi Ada!", "What is my name?"]);
}

#[tokio::test]
async fn test_document_question_is_rewritten() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("notes.md");
    std::fs::write(&doc, "# Ownership\n\nEvery value in Rust has a single owner.").unwrap();
    let input = format!("\"{}\" who owns a value?", doc.display());

    let llm = scripted(vec![
        Message::ai_with_tool_calls(
            "",
            vec![ToolCall::new(
                "call_1",
                "DocumentRetrieval",
                json!({"filepath": doc.to_string_lossy(), "query": "who owns a value?"}),
            )],
        ),
        Message::ai("Every value has a single owner."),
    ]);
    let session = session(dir.path(), llm.clone(), AgentProfile::V011).await;

    let outcome = session.send(&input, &NoopObserver).await.unwrap();

    assert_eq!(outcome.answer, "Every value has a single owner.");
    let sent = &outcome.new_messages[0].content;
    assert!(sent.starts_with("Use the below filepath"));
    assert!(sent.ends_with(&format!("filepath: {} , query: who owns a value?", doc.display())));

    let tool = &outcome.new_messages[2];
    assert_eq!(tool.role, Role::Tool);
    assert!(tool.content.contains("single owner"));
}

#[tokio::test]
async fn test_v01_profile_sends_input_unchanged() {
    let dir = TempDir::new().unwrap();
    let session = session(dir.path(), scripted(Vec::new()), AgentProfile::V01).await;

    assert_eq!(session.prepare_input("summarize report.pdf"), "summarize report.pdf");
}

#[tokio::test]
async fn test_turn_messages_are_persisted() {
    let dir = TempDir::new().unwrap();
    let llm = scripted(vec![
        Message::ai_with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "WebSearch", json!({"query": "rust"}))],
        ),
        Message::ai("Nothing found online."),
    ]);
    let session = session(dir.path(), llm, AgentProfile::V011).await;

    session.send("news about rust", &NoopObserver).await.unwrap();
    session.save(Some("persisted")).await.unwrap();
    let exported: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("chats").join("persisted.json")).unwrap(),
    )
    .unwrap();

    let roles: Vec<&str> = exported["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["human", "ai", "tool", "ai"]);
}

#[tokio::test]
async fn test_save_then_load_restores_conversation() {
    let dir = TempDir::new().unwrap();
    let llm = scripted(vec![Message::ai("Hello!")]);
    let session = session(dir.path(), llm, AgentProfile::V011).await;

    session.send("hi", &NoopObserver).await.unwrap();
    let path = session.save(None).await.unwrap();
    let name = path.file_stem().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("chat_"));

    assert!(!session.handle_line("exit", &NoopObserver).await.unwrap());
    assert_eq!(session.clear().await.unwrap(), 0);

    assert!(session.handle_line(&format!("/load {}", name), &NoopObserver).await.unwrap());
    let contents: Vec<(Role, String)> = session
        .messages()
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.role, m.content))
        .collect();
    assert_eq!(
        contents,
        vec![(Role::Human, "hi".to_string()), (Role::Ai, "Hello!".to_string())]
    );
}

#[tokio::test]
async fn test_load_unknown_chat_is_an_error() {
    let dir = TempDir::new().unwrap();
    let session = session(dir.path(), scripted(Vec::new()), AgentProfile::V011).await;

    let err = session.handle_line("/load missing", &NoopObserver).await.unwrap_err();
    assert!(matches!(err, Error::History(_)));
}

#[test]
fn test_render_markdown() {
    colored::control::set_override(false);
    let rendered = render_markdown(
        "# Summary\n\nRust has **ownership** and `borrowing`.\n\n- one\n- two\n  - nested\n\n1. first\n2. second\n\nSee [the book](https://doc.rust-lang.org/book/).",
    );
    assert_snapshot!(rendered, @r"
    Summary

    Rust has ownership and borrowing.

    • one
    • two
      • nested

    1. first
    2. second

    See the book (https://doc.rust-lang.org/book/).
    ");
}

#[test]
fn test_render_code_block() {
    colored::control::set_override(false);
    let rendered = render_markdown("Example:\n\n```rust\nlet x = 1;\nlet y = x;\n```\n");
    assert_eq!(rendered, "Example:\n\n    let x = 1;\n    let y = x;");
}
