//! Document chunks and chunking configuration

use serde::{Deserialize, Serialize};

/// A contiguous span of document text, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier of the source document (its normalized filepath)
    pub document_id: String,
    /// Position of the chunk within the document
    pub index: usize,
    pub text: String,
}

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 32,
        }
    }
}
