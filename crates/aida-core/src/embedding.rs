//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for text embedding models
///
/// Implementations return one vector per input text, in input order. All
/// vectors produced by one provider share the same dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::Embedding("No embedding returned".to_string()))
    }

    /// Identifier of the embedding model
    fn model_id(&self) -> &str;
}
