//! Qdrant-backed vector store

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;

use aida_core::{Chunk, Error, Result, ScoredChunk, SearchConfig, VectorRecord, VectorStore};

/// Vector store backed by a Qdrant server (gRPC)
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| Error::VectorStore(format!("Failed to connect to Qdrant at {}: {}", url, e)))?;
        Ok(Self { client })
    }
}

fn store_error(e: impl std::fmt::Display) -> Error {
    Error::VectorStore(e.to_string())
}

fn payload_for(chunk: &Chunk) -> Result<Payload> {
    Payload::try_from(serde_json::json!({
        "document_id": chunk.document_id,
        "index": chunk.index,
        "text": chunk.text,
    }))
    .map_err(store_error)
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> String {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => s.clone(),
        _ => String::new(),
    }
}

fn chunk_from_payload(payload: &HashMap<String, Value>) -> Chunk {
    let index = match payload.get("index").and_then(|v| v.kind.as_ref()) {
        Some(Kind::IntegerValue(i)) => (*i).max(0) as usize,
        Some(Kind::DoubleValue(d)) => d.max(0.0) as usize,
        _ => 0,
    };
    Chunk {
        document_id: payload_string(payload, "document_id"),
        index,
        text: payload_string(payload, "text"),
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.client.collection_exists(name).await.map_err(store_error)
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        if self.collection_exists(name).await? {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(store_error)?;
        tracing::debug!(collection = name, dimension, "created Qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<usize> {
        let written = records.len();
        let points = records
            .into_iter()
            .map(|record| {
                let payload = payload_for(&record.chunk)?;
                Ok(PointStruct::new(record.id, record.vector, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(store_error)?;
        Ok(written)
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredChunk>> {
        let mut request =
            SearchPointsBuilder::new(collection, vector.to_vec(), config.top_k as u64)
                .with_payload(true);
        if let Some(threshold) = config.score_threshold {
            request = request.score_threshold(threshold);
        }

        let response = self.client.search_points(request).await.map_err(store_error)?;
        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredChunk {
                chunk: chunk_from_payload(&point.payload),
                score: point.score,
            })
            .collect())
    }

    async fn document_id(&self, collection: &str) -> Result<Option<String>> {
        if !self.collection_exists(collection).await? {
            return Ok(None);
        }
        let response = self
            .client
            .scroll(ScrollPointsBuilder::new(collection).limit(1).with_payload(true))
            .await
            .map_err(store_error)?;
        Ok(response
            .result
            .first()
            .map(|point| chunk_from_payload(&point.payload).document_id))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        if !self.collection_exists(collection).await? {
            return Ok(0);
        }
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(store_error)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        if !self.collection_exists(name).await? {
            return Ok(false);
        }
        self.client.delete_collection(name).await.map_err(store_error)?;
        Ok(true)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self.client.list_collections().await.map_err(store_error)?;
        let mut names: Vec<String> = response.collections.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }
}
