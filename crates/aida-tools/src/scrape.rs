//! Web page extraction backends

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use aida_core::{Error, Result};

const TAVILY_EXTRACT_URL: &str = "https://api.tavily.com/extract";

/// The text content of one fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub raw_content: String,
}

/// Fetches pages and returns their readable text
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, urls: &[Url]) -> Result<Vec<ExtractedPage>>;

    fn name(&self) -> &'static str;
}

/// Parse and validate URLs; only `http` and `https` are accepted
pub fn parse_urls(raw: &[String]) -> Result<Vec<Url>> {
    if raw.is_empty() {
        return Err(Error::InvalidInput("at least one URL is required".to_string()));
    }
    raw.iter()
        .map(|candidate| {
            let url = Url::parse(candidate.trim())
                .map_err(|e| Error::InvalidInput(format!("Invalid URL '{}': {}", candidate, e)))?;
            match url.scheme() {
                "http" | "https" => Ok(url),
                scheme => Err(Error::InvalidInput(format!(
                    "Unsupported URL scheme '{}' in '{}'",
                    scheme, candidate
                ))),
            }
        })
        .collect()
}

/// Render extracted pages followed by the query to answer
pub fn format_extract_context(pages: &[ExtractedPage], query: &str) -> String {
    let mut context = String::new();
    for page in pages {
        context.push_str(&format!("URL: {}\n Raw Content: {}\n", page.url, page.raw_content));
    }
    context.push_str(&format!(
        "\n Answer the below query using the above context: \n Query: {}",
        query
    ));
    context
}

/// Tavily extract API
pub struct TavilyExtract {
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct TavilyExtractRequest<'a> {
    urls: Vec<&'a str>,
    include_images: bool,
}

#[derive(Deserialize)]
struct TavilyExtractResponse {
    #[serde(default)]
    results: Vec<ExtractedPage>,
    #[serde(default)]
    failed_results: Vec<serde_json::Value>,
}

impl TavilyExtract {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl PageExtractor for TavilyExtract {
    async fn extract(&self, urls: &[Url]) -> Result<Vec<ExtractedPage>> {
        let response = self
            .client
            .post(TAVILY_EXTRACT_URL)
            .bearer_auth(&self.api_key)
            .json(&TavilyExtractRequest {
                urls: urls.iter().map(|u| u.as_str()).collect(),
                include_images: false,
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
                "Tavily extract failed with status {}: {}",
                status, error_text
            )));
        }

        let body: TavilyExtractResponse = response
            .json()
            .await
            .map_err(|e| Error::Tool(format!("Failed to parse Tavily response: {}", e)))?;
        if !body.failed_results.is_empty() {
            tracing::warn!(failed = body.failed_results.len(), "some pages could not be extracted");
        }
        Ok(body.results)
    }

    fn name(&self) -> &'static str {
        "Tavily"
    }
}

/// Fetches pages directly and reduces their HTML to text
pub struct HtmlExtractor {
    client: Client,
}

impl HtmlExtractor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aida/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageExtractor for HtmlExtractor {
    async fn extract(&self, urls: &[Url]) -> Result<Vec<ExtractedPage>> {
        let mut pages = Vec::with_capacity(urls.len());
        for url in urls {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| Error::Network(format!("{}: {}", url, e)))?;
            if !response.status().is_success() {
                return Err(Error::Tool(format!(
                    "Fetching {} failed with status {}",
                    url,
                    response.status()
                )));
            }
            let html = response
                .text()
                .await
                .map_err(|e| Error::Network(format!("{}: {}", url, e)))?;
            pages.push(ExtractedPage {
                url: url.to_string(),
                raw_content: html_to_text(&html)?,
            });
        }
        Ok(pages)
    }

    fn name(&self) -> &'static str {
        "HTML"
    }
}

/// Readable text of an HTML page, one line per block element
pub(crate) fn html_to_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title, h1, h2, h3, h4, h5, h6, p, li, pre, blockquote, td, th")
        .map_err(|e| Error::Other(format!("Invalid selector: {:?}", e)))?;

    let lines: Vec<String> = document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();
    Ok(lines.join("\n"))
}
