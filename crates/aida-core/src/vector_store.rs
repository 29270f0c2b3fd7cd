//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::Result;

/// A chunk together with its embedding, as persisted in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A chunk returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: Some(0.2),
        }
    }
}

/// Trait for vector stores holding named embedding collections
///
/// Collections are created explicitly and survive process restarts for
/// persistent backends. Search results are ordered by descending score.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check whether a collection exists
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Create an empty collection for vectors of the given dimension
    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()>;

    /// Insert or replace records in a collection, returning how many were written
    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<usize>;

    /// Search a collection for the chunks closest to `vector`
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredChunk>>;

    /// `document_id` of the chunks stored in a collection, if it holds any
    async fn document_id(&self, collection: &str) -> Result<Option<String>>;

    /// Number of records in a collection (0 if it does not exist)
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Delete a collection, returning whether it existed
    async fn delete_collection(&self, name: &str) -> Result<bool>;

    /// Names of all collections
    async fn list_collections(&self) -> Result<Vec<String>>;
}
