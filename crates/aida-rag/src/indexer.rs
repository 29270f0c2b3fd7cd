//! Builds embedding collections from documents

use std::path::PathBuf;
use std::sync::Arc;

use aida_core::{EmbeddingProvider, Error, IndexingConfig, Result, VectorRecord, VectorStore};

use crate::chunker::{chunk_text, normalize_filepath, sanitize_collection_name};
use crate::loader::load_document;

/// Parses, chunks and embeds a document into its collection
pub struct DocumentIndexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: IndexingConfig,
}

impl DocumentIndexer {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: IndexingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Check whether a usable collection already exists for the document
    ///
    /// `true` means the document has already been embedded and can be queried.
    /// A collection of the same name built from another file is an error.
    pub async fn parse_document(&self, filepath: &str) -> Result<bool> {
        let collection = sanitize_collection_name(filepath);
        if self.store.count(&collection).await? == 0 {
            return Ok(false);
        }

        let requested = normalize_filepath(filepath);
        match self.store.document_id(&collection).await? {
            Some(existing) if !same_document(&existing, &requested) => {
                Err(Error::VectorStore(format!(
                    "Collection '{}' already holds '{}'; rename '{}' to query it",
                    collection, existing, requested
                )))
            }
            _ => Ok(true),
        }
    }

    /// Load, chunk and embed the document
    pub async fn initialize_embeddings(&self, filepath: &str) -> Result<Vec<VectorRecord>> {
        let document_id = normalize_filepath(filepath);
        let path = PathBuf::from(&document_id);
        let text = tokio::task::spawn_blocking(move || load_document(&path))
            .await
            .map_err(|e| Error::Other(format!("Document loader panicked: {}", e)))??;

        let chunks = chunk_text(&document_id, &text, &self.config);
        if chunks.is_empty() {
            return Err(Error::DocumentParse(format!(
                "'{}': document contains no extractable text",
                document_id
            )));
        }

        let mut records = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                records.push(VectorRecord {
                    id: record_id(&chunk.document_id, chunk.index),
                    chunk: chunk.clone(),
                    vector,
                });
            }
        }

        tracing::debug!(document = %document_id, chunks = records.len(), "embedded document");
        Ok(records)
    }

    /// Persist embedded chunks under the document's collection
    ///
    /// A failed write removes the partial collection so the next attempt
    /// starts clean.
    pub async fn store_embeddings(&self, filepath: &str, records: Vec<VectorRecord>) -> Result<String> {
        let collection = sanitize_collection_name(filepath);
        let dimension = records
            .first()
            .map(|r| r.vector.len())
            .ok_or_else(|| Error::Embedding("No embeddings to store".to_string()))?;

        // An empty collection left behind by an earlier failure
        if self.store.collection_exists(&collection).await? {
            self.store.delete_collection(&collection).await?;
        }

        let result: Result<usize> = async {
            self.store.create_collection(&collection, dimension).await?;
            self.store.upsert(&collection, records).await
        }
        .await;

        match result {
            Ok(written) => {
                tracing::info!(collection = %collection, chunks = written, "created embedding collection");
                Ok(collection)
            }
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "discarding partial collection");
                if let Err(cleanup) = self.store.delete_collection(&collection).await {
                    tracing::warn!(collection = %collection, error = %cleanup, "cleanup failed");
                }
                Err(e)
            }
        }
    }

    /// Build the document's collection unless it already exists
    ///
    /// Returns the collection name and whether it was built by this call.
    pub async fn ensure_collection(&self, filepath: &str) -> Result<(String, bool)> {
        if self.parse_document(filepath).await? {
            let collection = sanitize_collection_name(filepath);
            tracing::debug!(collection = %collection, "reusing embedding collection");
            return Ok((collection, false));
        }
        let records = self.initialize_embeddings(filepath).await?;
        let collection = self.store_embeddings(filepath, records).await?;
        Ok((collection, true))
    }
}

/// Two spellings of a path name the same file
fn same_document(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Stable UUID for a chunk, accepted by every store backend
fn record_id(document_id: &str, index: usize) -> String {
    let digest = md5::compute(format!("{}#{}", document_id, index).as_bytes());
    uuid::Uuid::from_bytes(digest.0).to_string()
}
