//! Retrieval-augmented generation pipeline for AiDA
//!
//! Documents are loaded by extension, split into overlapping chunks, embedded
//! and stored in a collection named after the file. The [`Retriever`] builds
//! a collection on the first query against a document and reuses it after.

mod chunker;
mod config;
mod embedder;
mod indexer;
mod loader;
mod local_store;
mod qdrant_store;
mod retriever;


use std::sync::Arc;

pub use chunker::{chunk_text, normalize_filepath, sanitize_collection_name};
pub use config::{EmbeddingKind, RagConfig, VectorStoreKind};
pub use embedder::{cosine_similarity, HashingEmbedder};
pub use indexer::DocumentIndexer;
pub use loader::{load_document, DocumentKind};
pub use local_store::LocalVectorStore;
pub use qdrant_store::QdrantVectorStore;
pub use retriever::{Retrieval, Retriever};

// Re-export core types for convenience
pub use aida_core::{
    Chunk, EmbeddingProvider, Error, IndexingConfig, Result, ScoredChunk, SearchConfig,
    VectorRecord, VectorStore,
};

/// Open the vector store selected by the configuration
pub fn build_vector_store(config: &RagConfig) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.vector_store {
        VectorStoreKind::Local => Arc::new(LocalVectorStore::new(config.vectors_dir())?),
        VectorStoreKind::Qdrant => Arc::new(QdrantVectorStore::new(
            &config.qdrant_url,
            config.qdrant_api_key.clone(),
        )?),
    };
    tracing::info!(backend = ?config.vector_store, "vector store ready");
    Ok(store)
}
