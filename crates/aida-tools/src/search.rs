//! Web search backends

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use aida_core::{Error, Result};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

/// A web search provider
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &'static str;
}

/// Render hits as `Source:` blocks, cut to at most `max_chars` characters
pub fn format_search_context(hits: &[SearchHit], max_chars: usize) -> String {
    let context = hits
        .iter()
        .map(|hit| format!("Source: {}\n{}", hit.url, hit.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    match context.char_indices().nth(max_chars) {
        Some((cut, _)) => context[..cut].to_string(),
        None => context,
    }
}

fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("aida/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

/// Tavily search API
pub struct TavilySearch {
    api_key: String,
    max_results: usize,
    client: Client,
}

#[derive(Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            max_results: 3,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .bearer_auth(&self.api_key)
            .json(&TavilySearchRequest {
                query,
                max_results: self.max_results,
                search_depth: "basic",
            })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Tool(format!(
                "Tavily search failed with status {}: {}",
                status, error_text
            )));
        }

        let body: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Tool(format!("Failed to parse Tavily response: {}", e)))?;

        Ok(body
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                content: r.content,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "Tavily"
    }
}

/// DuckDuckGo instant-answer API, used when no Tavily key is configured
pub struct DuckDuckGoSearch {
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(DUCKDUCKGO_URL)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Tool(format!(
                "DuckDuckGo search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Tool(format!("Failed to parse DuckDuckGo response: {}", e)))?;
        Ok(parse_duckduckgo(&payload))
    }

    fn name(&self) -> &'static str {
        "DuckDuckGo"
    }
}

pub(crate) fn parse_duckduckgo(payload: &Value) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    let abstract_text = payload.get("AbstractText").and_then(|v| v.as_str()).unwrap_or("");
    let abstract_url = payload.get("AbstractURL").and_then(|v| v.as_str()).unwrap_or("");
    if !abstract_text.is_empty() && !abstract_url.is_empty() {
        hits.push(SearchHit {
            title: payload
                .get("Heading")
                .and_then(|v| v.as_str())
                .unwrap_or(abstract_text)
                .to_string(),
            url: abstract_url.to_string(),
            content: abstract_text.to_string(),
        });
    }

    for key in ["Results", "RelatedTopics"] {
        if let Some(items) = payload.get(key).and_then(|v| v.as_array()) {
            collect_topics(items, &mut hits);
        }
    }
    hits
}

fn collect_topics(items: &[Value], hits: &mut Vec<SearchHit>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            collect_topics(topics, hits);
            continue;
        }
        let text = item.get("Text").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        hits.push(SearchHit {
            title: text.split(" - ").next().unwrap_or(text).to_string(),
            url: url.to_string(),
            content: text.to_string(),
        });
    }
}
