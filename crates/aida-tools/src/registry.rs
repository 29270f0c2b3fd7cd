//! Tool registry and dispatch

use std::path::PathBuf;
use std::sync::Arc;

use aida_core::{Error, Result, ToolCall, ToolSpec};
use aida_rag::{Retrieval, Retriever};

use crate::config::ToolsConfig;
use crate::save::save_content;
use crate::scrape::{format_extract_context, parse_urls, HtmlExtractor, PageExtractor, TavilyExtract};
use crate::search::{format_search_context, DuckDuckGoSearch, SearchBackend, TavilySearch};
use crate::tool::{ToolInvocation, ToolKind};

/// Result of one tool execution, fed back to the LLM as a tool message
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// The set of tools enabled for an agent, with the backends they use
pub struct ToolRegistry {
    enabled: Vec<ToolKind>,
    retriever: Arc<Retriever>,
    search: Arc<dyn SearchBackend>,
    extractor: Arc<dyn PageExtractor>,
    output_dir: PathBuf,
    max_search_chars: usize,
}

impl ToolRegistry {
    pub fn new(
        enabled: Vec<ToolKind>,
        retriever: Arc<Retriever>,
        search: Arc<dyn SearchBackend>,
        extractor: Arc<dyn PageExtractor>,
        config: &ToolsConfig,
    ) -> Self {
        Self {
            enabled,
            retriever,
            search,
            extractor,
            output_dir: config.output_dir.clone(),
            max_search_chars: config.max_search_chars,
        }
    }

    /// Build a registry whose web tools use Tavily when a key is configured
    pub fn from_config(
        config: &ToolsConfig,
        enabled: Vec<ToolKind>,
        retriever: Arc<Retriever>,
    ) -> Result<Self> {
        let (search, extractor): (Arc<dyn SearchBackend>, Arc<dyn PageExtractor>) =
            match &config.tavily_api_key {
                Some(key) => (
                    Arc::new(TavilySearch::new(key.clone(), config.timeout())?),
                    Arc::new(TavilyExtract::new(key.clone(), config.timeout())?),
                ),
                None => {
                    tracing::warn!("TAVILY_API_KEY not set, falling back to DuckDuckGo and direct page fetches");
                    (
                        Arc::new(DuckDuckGoSearch::new(config.timeout())?),
                        Arc::new(HtmlExtractor::new(config.timeout())?),
                    )
                }
            };
        Ok(Self::new(enabled, retriever, search, extractor, config))
    }

    pub fn enabled(&self) -> &[ToolKind] {
        &self.enabled
    }

    /// Specs of the enabled tools, as offered to the LLM
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.enabled.iter().map(|k| k.spec()).collect()
    }

    /// Resolve and validate a raw tool call
    pub fn parse(&self, call: &ToolCall) -> Result<ToolInvocation> {
        let kind = ToolKind::from_name(&call.name)
            .filter(|k| self.enabled.contains(k))
            .ok_or_else(|| Error::UnknownTool(call.name.clone()))?;
        ToolInvocation::from_call(kind, call)
    }

    /// Execute a raw tool call; never fails
    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let invocation = match self.parse(call) {
            Ok(invocation) => invocation,
            Err(Error::UnknownTool(name)) => {
                tracing::warn!(tool = %name, "requested tool is not available");
                return ToolOutput::error(format!("Requested tool is not available: {}", name));
            }
            Err(e) => return ToolOutput::error(format!("Error: {}", e)),
        };

        let kind = invocation.kind();
        tracing::info!(tool = %kind, call_id = %call.id, "running tool");
        match self.run(invocation).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %kind, error = %e, "tool failed");
                ToolOutput::error(format!("Error: {}", e))
            }
        }
    }

    async fn run(&self, invocation: ToolInvocation) -> Result<ToolOutput> {
        match invocation {
            ToolInvocation::DocumentRetrieval(args) => {
                match self.retriever.retrieve(&args.filepath, &args.query).await? {
                    found @ Retrieval::Found(_) => Ok(ToolOutput::ok(found.to_context())),
                    Retrieval::NoRelevantContent => Ok(ToolOutput::ok(format!(
                        "No relevant content found in '{}' for the query: {}",
                        args.filepath, args.query
                    ))),
                }
            }
            ToolInvocation::WebSearch(args) => {
                let hits = self.search.search(&args.query).await?;
                if hits.is_empty() {
                    return Ok(ToolOutput::ok(format!(
                        "No web results found for: {}",
                        args.query
                    )));
                }
                tracing::debug!(backend = self.search.name(), hits = hits.len(), "web search done");
                Ok(ToolOutput::ok(format_search_context(&hits, self.max_search_chars)))
            }
            ToolInvocation::WebsiteScraper(args) => {
                let urls = parse_urls(&args.url.into_vec())?;
                let pages = self.extractor.extract(&urls).await?;
                if pages.is_empty() {
                    return Err(Error::Tool("None of the pages could be extracted".to_string()));
                }
                Ok(ToolOutput::ok(format_extract_context(&pages, &args.query)))
            }
            ToolInvocation::SaveContent(args) => {
                let (path, bytes) = save_content(&self.output_dir, &args.filename, &args.content).await?;
                Ok(ToolOutput::ok(format!(
                    "Saved {} bytes to {}",
                    bytes,
                    path.display()
                )))
            }
        }
    }
}
