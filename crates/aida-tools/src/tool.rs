//! Tool identities, argument types and JSON schemas

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use aida_core::{Error, Result, ToolCall, ToolSpec};

/// The closed set of tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    DocumentRetrieval,
    WebSearch,
    WebsiteScraper,
    SaveContent,
}

impl ToolKind {
    pub fn all() -> Vec<ToolKind> {
        vec![
            ToolKind::DocumentRetrieval,
            ToolKind::WebSearch,
            ToolKind::WebsiteScraper,
            ToolKind::SaveContent,
        ]
    }

    /// Name the LLM uses to call the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::DocumentRetrieval => "DocumentRetrieval",
            ToolKind::WebSearch => "WebSearch",
            ToolKind::WebsiteScraper => "WebsiteScraper",
            ToolKind::SaveContent => "SaveContent",
        }
    }

    /// Resolve a tool name; the document-query prompt calls it "DocumentRetriever"
    pub fn from_name(name: &str) -> Option<ToolKind> {
        let name = name.trim();
        if name == "DocumentRetriever" {
            return Some(ToolKind::DocumentRetrieval);
        }
        Self::all().into_iter().find(|k| k.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::DocumentRetrieval => {
                "Retrieves the passages of a local document (pdf, docx, pptx, md, txt) most relevant to a query. Pass the filepath exactly as the user gave it."
            }
            ToolKind::WebSearch => {
                "Searches the web and returns short excerpts with their source URLs. Use it for recent events or facts you are unsure about."
            }
            ToolKind::WebsiteScraper => {
                "Fetches the content of one or more web pages so a query about them can be answered."
            }
            ToolKind::SaveContent => {
                "Saves generated content to a file in the output directory. The filename must not contain directories."
            }
        }
    }

    /// JSON Schema of the tool's arguments
    pub fn parameters(&self) -> Value {
        match self {
            ToolKind::DocumentRetrieval => json!({
                "type": "object",
                "properties": {
                    "filepath": {"type": "string", "description": "Path of the document to search"},
                    "query": {"type": "string", "description": "What to look for in the document"}
                },
                "required": ["filepath", "query"]
            }),
            ToolKind::WebSearch => json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"}
                },
                "required": ["query"]
            }),
            ToolKind::WebsiteScraper => json!({
                "type": "object",
                "properties": {
                    "url": {
                        "anyOf": [
                            {"type": "string"},
                            {"type": "array", "items": {"type": "string"}}
                        ],
                        "description": "URL or list of URLs to scrape"
                    },
                    "query": {"type": "string", "description": "Question to answer from the pages"}
                },
                "required": ["url", "query"]
            }),
            ToolKind::SaveContent => json!({
                "type": "object",
                "properties": {
                    "filename": {"type": "string", "description": "File name, e.g. summary.md"},
                    "content": {"type": "string", "description": "Text to write"}
                },
                "required": ["filename", "content"]
            }),
        }
    }

    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentRetrievalArgs {
    pub filepath: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
}

/// One URL or several
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UrlInput {
    One(String),
    Many(Vec<String>),
}

impl UrlInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            UrlInput::One(url) => vec![url],
            UrlInput::Many(urls) => urls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebsiteScraperArgs {
    pub url: UrlInput,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaveContentArgs {
    pub filename: String,
    pub content: String,
}

/// A validated call to one tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    DocumentRetrieval(DocumentRetrievalArgs),
    WebSearch(WebSearchArgs),
    WebsiteScraper(WebsiteScraperArgs),
    SaveContent(SaveContentArgs),
}

impl ToolInvocation {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolInvocation::DocumentRetrieval(_) => ToolKind::DocumentRetrieval,
            ToolInvocation::WebSearch(_) => ToolKind::WebSearch,
            ToolInvocation::WebsiteScraper(_) => ToolKind::WebsiteScraper,
            ToolInvocation::SaveContent(_) => ToolKind::SaveContent,
        }
    }

    /// Validate a call's arguments against the tool's argument type
    pub fn from_call(kind: ToolKind, call: &ToolCall) -> Result<Self> {
        let invocation = match kind {
            ToolKind::DocumentRetrieval => {
                let mut args: DocumentRetrievalArgs = decode(kind, &call.arguments)?;
                args.filepath = args.filepath.trim().to_string();
                if args.filepath.is_empty() {
                    return Err(Error::InvalidInput("filepath must not be empty".to_string()));
                }
                ToolInvocation::DocumentRetrieval(args)
            }
            ToolKind::WebSearch => ToolInvocation::WebSearch(decode(kind, &call.arguments)?),
            ToolKind::WebsiteScraper => {
                ToolInvocation::WebsiteScraper(decode(kind, &call.arguments)?)
            }
            ToolKind::SaveContent => ToolInvocation::SaveContent(decode(kind, &call.arguments)?),
        };
        Ok(invocation)
    }
}

fn decode<T: DeserializeOwned>(kind: ToolKind, arguments: &Value) -> Result<T> {
    // Some models send the arguments object JSON-encoded a second time
    let value = match arguments {
        Value::String(raw) => serde_json::from_str(raw).map_err(|e| {
            Error::InvalidInput(format!("Invalid arguments for {}: {}", kind, e))
        })?,
        other => other.clone(),
    };
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidInput(format!("Invalid arguments for {}: {}", kind, e)))
}
