//! RAG pipeline configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use aida_core::{Error, IndexingConfig, Result, SearchConfig};

/// Which vector store backs the embedding collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    Local,
    Qdrant,
}

/// Which model computes embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    Hash,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub data_dir: PathBuf,
    pub vector_store: VectorStoreKind,
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub embedding: EmbeddingKind,
    pub indexing: IndexingConfig,
    pub search: SearchConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".aida"),
            vector_store: VectorStoreKind::Local,
            qdrant_url: "http://localhost:6334".to_string(),
            qdrant_api_key: None,
            embedding: EmbeddingKind::Hash,
            indexing: IndexingConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl RagConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(dir) = get("AIDA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(kind) = get("VECTOR_STORE") {
            config.vector_store = match kind.to_lowercase().as_str() {
                "local" => VectorStoreKind::Local,
                "qdrant" => VectorStoreKind::Qdrant,
                other => {
                    return Err(Error::Configuration(format!(
                        "Unknown VECTOR_STORE '{}' (expected local or qdrant)",
                        other
                    )));
                }
            };
        }
        if let Some(kind) = get("EMBEDDING_PROVIDER") {
            config.embedding = match kind.to_lowercase().as_str() {
                "hash" => EmbeddingKind::Hash,
                "ollama" => EmbeddingKind::Ollama,
                other => {
                    return Err(Error::Configuration(format!(
                        "Unknown EMBEDDING_PROVIDER '{}' (expected hash or ollama)",
                        other
                    )));
                }
            };
        }
        if let Some(url) = get("QDRANT_URL") {
            config.qdrant_url = url;
        }
        config.qdrant_api_key = get("QDRANT_API_KEY");

        config.indexing.chunk_size = parse_or(get("RAG_CHUNK_SIZE"), config.indexing.chunk_size)?;
        config.indexing.chunk_overlap =
            parse_or(get("RAG_CHUNK_OVERLAP"), config.indexing.chunk_overlap)?;
        config.search.top_k = parse_or(get("RAG_TOP_K"), config.search.top_k)?;
        if let Some(threshold) = get("RAG_SCORE_THRESHOLD") {
            config.search.score_threshold = match threshold.to_lowercase().as_str() {
                "none" | "off" => None,
                value => Some(value.parse().map_err(|_| {
                    Error::Configuration(format!("Invalid RAG_SCORE_THRESHOLD '{}'", value))
                })?),
            };
        }

        if config.indexing.chunk_size == 0 {
            return Err(Error::Configuration("RAG_CHUNK_SIZE must be positive".to_string()));
        }
        Ok(config)
    }

    /// Directory holding the local store's collection files
    pub fn vectors_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Configuration(format!("Invalid number '{}'", raw))),
        None => Ok(default),
    }
}
