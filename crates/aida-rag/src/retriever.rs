//! Query-time retrieval over per-document collections

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use aida_core::{Result, ScoredChunk, SearchConfig};

use crate::chunker::{normalize_filepath, sanitize_collection_name};
use crate::indexer::DocumentIndexer;

/// Outcome of a retrieval that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// Matching chunks, most relevant first
    Found(Vec<ScoredChunk>),
    /// The document was searched but nothing passed the score threshold
    NoRelevantContent,
}

impl Retrieval {
    pub fn is_found(&self) -> bool {
        matches!(self, Retrieval::Found(_))
    }

    /// Render the chunks as numbered context blocks for the LLM
    pub fn to_context(&self) -> String {
        match self {
            Retrieval::Found(chunks) => chunks
                .iter()
                .enumerate()
                .map(|(i, scored)| format!("Document: {}\n{}\n", i + 1, scored.chunk.text))
                .collect(),
            Retrieval::NoRelevantContent => String::new(),
        }
    }
}

/// Answers queries against documents, embedding each document on first use
pub struct Retriever {
    indexer: DocumentIndexer,
    search: SearchConfig,
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Retriever {
    pub fn new(indexer: DocumentIndexer, search: SearchConfig) -> Self {
        Self {
            indexer,
            search,
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn indexer(&self) -> &DocumentIndexer {
        &self.indexer
    }

    async fn build_lock(&self, collection: &str) -> Arc<Mutex<()>> {
        let mut locks = self.build_locks.lock().await;
        locks
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock of `collection` once no caller holds it
    async fn release_build_lock(&self, collection: &str) {
        let mut locks = self.build_locks.lock().await;
        if locks
            .get(collection)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(collection);
        }
    }

    /// Return the chunks of `filepath` most relevant to `query`
    pub async fn retrieve(&self, filepath: &str, query: &str) -> Result<Retrieval> {
        let filepath = normalize_filepath(filepath);
        let collection = sanitize_collection_name(&filepath);

        let lock = self.build_lock(&collection).await;
        let ensured = {
            let _guard = lock.lock().await;
            self.indexer.ensure_collection(&filepath).await
        };
        drop(lock);
        self.release_build_lock(&collection).await;
        ensured?;

        let vector = self.indexer.embedder().embed_query(query).await?;
        let chunks = self
            .indexer
            .store()
            .search(&collection, &vector, &self.search)
            .await?;

        tracing::debug!(
            collection = %collection,
            results = chunks.len(),
            "retrieved document context"
        );

        if chunks.is_empty() {
            Ok(Retrieval::NoRelevantContent)
        } else {
            Ok(Retrieval::Found(chunks))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashingEmbedder, LocalVectorStore};
    use aida_core::IndexingConfig;
    use std::fs;
    use tempfile::TempDir;

    fn retriever(dir: &TempDir) -> Retriever {
        let store = Arc::new(LocalVectorStore::new(dir.path().join("vectors")).unwrap());
        let indexer = DocumentIndexer::new(
            store,
            Arc::new(HashingEmbedder::default()),
            IndexingConfig::default(),
        );
        Retriever::new(indexer, SearchConfig::default())
    }

    #[tokio::test]
    async fn test_build_locks_are_released() {
        let dir = TempDir::new().unwrap();
        let retriever = retriever(&dir);
        let mut paths = Vec::new();
        for name in ["one.txt", "two.txt"] {
            let path = dir.path().join(name);
            fs::write(&path, "Ownership gives every value a single owner.").unwrap();
            paths.push(path.to_string_lossy().to_string());
        }

        let (a, b) = futures::future::join(
            retriever.retrieve(&paths[0], "who owns a value"),
            retriever.retrieve(&paths[1], "who owns a value"),
        )
        .await;
        a.unwrap();
        b.unwrap();
        retriever
            .retrieve(&dir.path().join("missing.txt").to_string_lossy(), "x")
            .await
            .unwrap_err();

        assert!(retriever.build_locks.lock().await.is_empty());
    }
}
