//! Registry dispatch tests with stub web backends

use async_trait::async_trait;
use insta::assert_snapshot;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

use aida_rag::{DocumentIndexer, HashingEmbedder, IndexingConfig, LocalVectorStore, Retriever, SearchConfig};

use crate::{
    ExtractedPage, PageExtractor, Result, SearchBackend, SearchHit, ToolCall, ToolKind,
    ToolRegistry, ToolsConfig,
};

struct StubSearch;

#[async_trait]
impl SearchBackend for StubSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        if query == "nothing" {
            return Ok(Vec::new());
        }
        Ok(vec![SearchHit {
            title: "Result".to_string(),
            url: "https://news.example/1".to_string(),
            content: format!("About {}", query),
        }])
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct StubExtractor;

#[async_trait]
impl PageExtractor for StubExtractor {
    async fn extract(&self, urls: &[Url]) -> Result<Vec<ExtractedPage>> {
        Ok(urls
            .iter()
            .map(|u| ExtractedPage {
                url: u.to_string(),
                raw_content: format!("content of {}", u.host_str().unwrap_or_default()),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn registry(dir: &Path, enabled: Vec<ToolKind>) -> ToolRegistry {
    let store = Arc::new(LocalVectorStore::new(dir.join("vectors")).unwrap());
    let indexer = DocumentIndexer::new(
        store,
        Arc::new(HashingEmbedder::default()),
        IndexingConfig::default(),
    );
    let retriever = Arc::new(Retriever::new(indexer, SearchConfig::default()));
    let config = ToolsConfig {
        output_dir: dir.join("outputs"),
        ..Default::default()
    };
    ToolRegistry::new(enabled, retriever, Arc::new(StubSearch), Arc::new(StubExtractor), &config)
}

fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall::new("call_1", name, arguments)
}

#[test]
fn test_specs_follow_enabled_tools() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());
    let names: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
    assert_snapshot!(names.join(", "), @"DocumentRetrieval, WebSearch, WebsiteScraper, SaveContent");

    let spec = ToolKind::DocumentRetrieval.spec();
    assert_eq!(spec.parameters["required"], json!(["filepath", "query"]));
}

#[tokio::test]
async fn test_unknown_tool_is_reported() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());
    let output = registry.execute(&call("PythonREPL", json!({}))).await;
    assert!(output.is_error);
    assert_eq!(output.content, "Requested tool is not available: PythonREPL");
}

#[tokio::test]
async fn test_disabled_tool_is_unknown() {
    let dir = TempDir::new().unwrap();
    let registry = registry(
        dir.path(),
        vec![ToolKind::DocumentRetrieval, ToolKind::WebSearch, ToolKind::WebsiteScraper],
    );
    let output = registry
        .execute(&call("SaveContent", json!({"filename": "a.txt", "content": "x"})))
        .await;
    assert!(output.is_error);
    assert!(!dir.path().join("outputs").exists());
}

#[tokio::test]
async fn test_missing_document_becomes_error_text() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());
    let missing = dir.path().join("missing.pdf");
    let output = registry
        .execute(&call(
            "DocumentRetrieval",
            json!({"filepath": missing.to_string_lossy(), "query": "summary"}),
        ))
        .await;
    assert!(output.is_error);
    assert!(output.content.starts_with("Error: File '"));
    assert!(output.content.contains("not found"));
}

#[tokio::test]
async fn test_document_retrieval_returns_context() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("notes.md");
    std::fs::write(&doc, "# Deployment\n\nThe service is deployed with a blue green rollout every Friday.\n").unwrap();
    let registry = registry(dir.path(), ToolKind::all());

    let output = registry
        .execute(&call(
            "DocumentRetrieval",
            json!({"filepath": format!(" {} ", doc.to_string_lossy()), "query": "how is the service deployed"}),
        ))
        .await;
    assert!(!output.is_error, "{}", output.content);
    assert!(output.content.starts_with("Document: 1\n"));
    assert!(output.content.contains("blue green rollout"));
}

#[tokio::test]
async fn test_web_search_formats_hits() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());

    let output = registry.execute(&call("WebSearch", json!({"query": "rust 2024"}))).await;
    assert_snapshot!(output.content, @r###"
    Source: https://news.example/1
    About rust 2024
    "###);

    let empty = registry.execute(&call("WebSearch", json!({"query": "nothing"}))).await;
    assert!(!empty.is_error);
    assert_eq!(empty.content, "No web results found for: nothing");
}

#[tokio::test]
async fn test_scraper_validates_urls() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());

    let output = registry
        .execute(&call(
            "WebsiteScraper",
            json!({"url": ["https://a.example", "https://b.example/x"], "query": "compare"}),
        ))
        .await;
    assert!(!output.is_error);
    assert!(output.content.contains("URL: https://a.example/\n Raw Content: content of a.example\n"));
    assert!(output.content.ends_with("Query: compare"));

    let rejected = registry
        .execute(&call("WebsiteScraper", json!({"url": "ftp://files.example", "query": "q"})))
        .await;
    assert!(rejected.is_error);
    assert!(rejected.content.contains("ftp"));
}

#[tokio::test]
async fn test_save_content_through_registry() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());

    let output = registry
        .execute(&call("SaveContent", json!({"filename": "plan.md", "content": "step 1"})))
        .await;
    assert!(!output.is_error);
    assert!(output.content.starts_with("Saved 6 bytes to "));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("outputs/plan.md")).unwrap(),
        "step 1"
    );

    let traversal = registry
        .execute(&call("SaveContent", json!({"filename": "../plan.md", "content": "x"})))
        .await;
    assert!(traversal.is_error);
}

#[tokio::test]
async fn test_malformed_arguments_are_reported() {
    let dir = TempDir::new().unwrap();
    let registry = registry(dir.path(), ToolKind::all());
    let output = registry.execute(&call("WebSearch", json!({"q": "typo"}))).await;
    assert!(output.is_error);
    assert!(output.content.contains("Invalid arguments for WebSearch"));
}
