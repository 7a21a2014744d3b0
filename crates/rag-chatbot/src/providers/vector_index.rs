//! Vector index capability for nearest-neighbour lookups

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// Raw match returned by the index, before any filtering
#[derive(Debug, Clone, Default)]
pub struct IndexMatch {
    /// Record ID
    pub id: String,
    /// Similarity score (higher is more similar)
    pub score: Option<f32>,
    /// Record metadata (`text`, `source`, ...)
    pub metadata: Option<Map<String, Value>>,
}

impl IndexMatch {
    /// String metadata field, if present and a string
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

/// Trait for top-K similarity search against a single named index
///
/// Implementations:
/// - `PineconeIndex`: Pinecone serverless index over REST
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` matches ordered by descending similarity
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>>;

    /// Whether credentials were supplied at construction
    fn is_available(&self) -> bool;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
