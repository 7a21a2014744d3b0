//! Similarity search over the document index
//!
//! The gateway never fails its caller: an unreachable or misconfigured index
//! yields an empty result and the answer is generated without context.

use std::sync::Arc;

use crate::providers::{IndexMatch, VectorIndex};
use crate::types::{RetrievalResult, RetrievedMatch};

/// Characters of fragment text included in retrieval logs
const PREVIEW_CHARS: usize = 100;

/// Top-K search policy around a vector index
#[derive(Clone)]
pub struct VectorIndexGateway {
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl VectorIndexGateway {
    pub fn new(index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// Whether the underlying index has credentials
    pub fn is_available(&self) -> bool {
        self.index.is_available()
    }

    /// Retrieve the contexts and sources nearest to `vector`
    ///
    /// Matches without a text payload are skipped; they still took one of the
    /// `top_k` slots upstream, so fewer than `top_k` results may come back.
    pub async fn search(&self, vector: &[f32]) -> RetrievalResult {
        let matches = match self.index.query(vector, self.top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!("Error searching knowledge base ({}): {}", self.index.name(), e);
                return RetrievalResult::empty();
            }
        };

        if matches.is_empty() {
            tracing::info!("No matches found in {} search", self.index.name());
            return RetrievalResult::empty();
        }

        tracing::info!("Found {} matches from {}", matches.len(), self.index.name());

        let result: RetrievalResult = matches.iter().filter_map(to_retrieved_match).collect();

        tracing::info!("Total contexts retrieved: {}", result.len());
        result
    }
}

/// Convert an index hit, dropping it when it carries no text
fn to_retrieved_match(hit: &IndexMatch) -> Option<RetrievedMatch> {
    let text = hit.metadata_str("text")?;
    let source = hit
        .metadata_str("source")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Doc_{}", hit.id));
    let score = hit.score.unwrap_or(0.0);

    tracing::info!(
        "Retrieved document - Score: {:.4}, Source: {}, Text preview: {}...",
        score,
        source,
        preview(text)
    );

    Some(RetrievedMatch {
        text: text.to_string(),
        source,
        score,
    })
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
