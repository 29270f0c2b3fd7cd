//! On-disk vector store with one JSON file per collection

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use aida_core::{Error, Result, ScoredChunk, SearchConfig, VectorRecord, VectorStore};

use crate::embedder::cosine_similarity;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionFile {
    name: String,
    dimension: usize,
    records: Vec<VectorRecord>,
}

/// Vector store persisted under a directory
///
/// Collections are cached in memory after first use. Every write replaces the
/// collection file atomically.
pub struct LocalVectorStore {
    dir: PathBuf,
    collections: RwLock<HashMap<String, CollectionFile>>,
}

impl LocalVectorStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            collections: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::InvalidInput(format!(
                "Invalid collection name '{}'",
                name
            )));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    fn read_file(path: &Path) -> Result<Option<CollectionFile>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let data: CollectionFile = serde_json::from_str(&content).map_err(|e| {
            Error::VectorStore(format!("Corrupt collection file {}: {}", path.display(), e))
        })?;
        Ok(Some(data))
    }

    fn write_file(&self, path: &Path, data: &CollectionFile) -> Result<()> {
        let content = serde_json::to_vec(data)?;
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)?;
        file.write_all(&content)?;
        file.persist(path)
            .map_err(|e| Error::VectorStore(format!("Failed to persist {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Make sure `name` is loaded into the cache, returning whether it exists
    async fn load(&self, name: &str) -> Result<bool> {
        if self.collections.read().await.contains_key(name) {
            return Ok(true);
        }
        let path = self.collection_path(name)?;
        match Self::read_file(&path)? {
            Some(data) => {
                self.collections
                    .write()
                    .await
                    .entry(name.to_string())
                    .or_insert(data);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.load(name).await
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        if self.load(name).await? {
            return Ok(());
        }
        let path = self.collection_path(name)?;
        let data = CollectionFile {
            name: name.to_string(),
            dimension,
            records: Vec::new(),
        };
        self.write_file(&path, &data)?;
        self.collections.write().await.insert(name.to_string(), data);
        tracing::debug!(collection = name, dimension, "created local collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<usize> {
        if !self.load(collection).await? {
            return Err(Error::VectorStore(format!(
                "Collection '{}' does not exist",
                collection
            )));
        }
        let path = self.collection_path(collection)?;

        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| {
            Error::VectorStore(format!("Collection '{}' does not exist", collection))
        })?;

        if let Some(bad) = records.iter().find(|r| r.vector.len() != data.dimension) {
            return Err(Error::VectorStore(format!(
                "Vector of dimension {} does not fit collection '{}' (dimension {})",
                bad.vector.len(),
                collection,
                data.dimension
            )));
        }

        let mut updated = data.clone();
        let written = records.len();
        for record in records {
            updated.records.retain(|r| r.id != record.id);
            updated.records.push(record);
        }
        self.write_file(&path, &updated)?;
        *data = updated;
        Ok(written)
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredChunk>> {
        if !self.load(collection).await? {
            return Err(Error::VectorStore(format!(
                "Collection '{}' does not exist",
                collection
            )));
        }
        let collections = self.collections.read().await;
        let Some(data) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        if vector.len() != data.dimension {
            return Err(Error::VectorStore(format!(
                "Query vector of dimension {} does not fit collection '{}' (dimension {})",
                vector.len(),
                collection,
                data.dimension
            )));
        }

        let mut scored: Vec<ScoredChunk> = data
            .records
            .iter()
            .map(|record| ScoredChunk {
                chunk: record.chunk.clone(),
                score: cosine_similarity(vector, &record.vector),
            })
            .filter(|s| config.score_threshold.is_none_or(|t| s.score >= t))
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(config.top_k);
        Ok(scored)
    }

    async fn document_id(&self, collection: &str) -> Result<Option<String>> {
        if !self.load(collection).await? {
            return Ok(None);
        }
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|data| data.records.first())
            .map(|record| record.chunk.document_id.clone()))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        if !self.load(collection).await? {
            return Ok(0);
        }
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.records.len())
            .unwrap_or(0))
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        let path = self.collection_path(name)?;
        let cached = self.collections.write().await.remove(name).is_some();
        let on_disk = path.exists();
        if on_disk {
            fs::remove_file(&path)?;
        }
        Ok(cached || on_disk)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
