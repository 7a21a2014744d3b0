//! Embedding provider trait for turning a question into a query vector

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI embeddings API (text-embedding-3-small)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    ///
    /// Upstream failures surface as `Error::Embedding`; nothing is retried.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Whether credentials were supplied at construction
    fn is_available(&self) -> bool;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
