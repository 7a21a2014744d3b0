//! Deterministic provider doubles for tests

use async_trait::async_trait;
use futures::stream;
use serde_json::{json, Map};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::generation::{NOT_IN_DOCS, NO_CONTEXT_MARKER};
use crate::providers::{
    ChatModel, CompletionRequest, EmbeddingProvider, FragmentStream, IndexMatch, VectorIndex,
};

/// Build an index hit with optional `text` and `source` metadata
pub fn hit(id: &str, score: f32, text: Option<&str>, source: Option<&str>) -> IndexMatch {
    let mut metadata = Map::new();
    if let Some(text) = text {
        metadata.insert("text".to_string(), json!(text));
    }
    if let Some(source) = source {
        metadata.insert("source".to_string(), json!(source));
    }
    IndexMatch {
        id: id.to_string(),
        score: Some(score),
        metadata: Some(metadata),
    }
}

/// Embedder returning a constant vector
pub struct MockEmbedder {
    available: bool,
    fail: bool,
    dims: usize,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { available: true, fail: false, dims, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(4) }
    }

    pub fn unavailable() -> Self {
        Self { available: false, ..Self::new(4) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::embedding("upstream returned HTTP 500 with secret details"));
        }
        Ok(vec![0.5; self.dims])
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Index returning fixed matches
pub struct MockIndex {
    available: bool,
    fail: bool,
    matches: Vec<IndexMatch>,
    calls: AtomicUsize,
    last_top_k: Mutex<Option<usize>>,
}

impl MockIndex {
    pub fn with_matches(matches: Vec<IndexMatch>) -> Self {
        Self {
            available: true,
            fail: false,
            matches,
            calls: AtomicUsize::new(0),
            last_top_k: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::with_matches(Vec::new())
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::empty() }
    }

    pub fn unavailable() -> Self {
        Self { available: false, ..Self::empty() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_top_k(&self) -> Option<usize> {
        *self.last_top_k.lock().unwrap()
    }
}

#[async_trait]
impl VectorIndex for MockIndex {
    async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_top_k.lock().unwrap() = Some(top_k);
        if self.fail {
            return Err(Error::vector_index("dimension mismatch: 4 vs 1536"));
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Clone)]
enum ChatBehavior {
    /// Fixed fragments; `complete` returns their concatenation
    Fragments(Vec<String>),
    /// Answer from the prompt: sentinel without context, else quote the context
    Grounded,
    /// Fail before producing anything
    Fail,
    /// Stream the fragments, then fail
    FailAfter(Vec<String>),
}

/// Chat model with scripted output
pub struct MockChat {
    available: bool,
    behavior: ChatBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockChat {
    fn with_behavior(behavior: ChatBehavior) -> Self {
        Self {
            available: true,
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with_behavior(ChatBehavior::Fragments(vec![text.to_string()]))
    }

    pub fn streaming(fragments: Vec<&str>) -> Self {
        Self::with_behavior(ChatBehavior::Fragments(
            fragments.into_iter().map(str::to_string).collect(),
        ))
    }

    pub fn grounded() -> Self {
        Self::with_behavior(ChatBehavior::Grounded)
    }

    pub fn failing() -> Self {
        Self::with_behavior(ChatBehavior::Fail)
    }

    pub fn failing_after(fragments: Vec<&str>) -> Self {
        Self::with_behavior(ChatBehavior::FailAfter(
            fragments.into_iter().map(str::to_string).collect(),
        ))
    }

    pub fn unavailable() -> Self {
        Self { available: false, ..Self::replying("unused") }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, request: &CompletionRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
    }

    fn grounded_answer(request: &CompletionRequest) -> Vec<String> {
        let user = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let answer = if user.contains(NO_CONTEXT_MARKER) {
            NOT_IN_DOCS.to_string()
        } else {
            let context = user
                .strip_prefix("Context:\n")
                .and_then(|rest| rest.split("\n\n").next())
                .unwrap_or_default();
            format!("According to the documents, {}", context)
        };

        answer.split_inclusive(' ').map(str::to_string).collect()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.record(request);
        match &self.behavior {
            ChatBehavior::Fragments(fragments) => Ok(fragments.concat()),
            ChatBehavior::Grounded => Ok(Self::grounded_answer(request).concat()),
            ChatBehavior::Fail | ChatBehavior::FailAfter(_) => {
                Err(Error::generation("upstream returned HTTP 500 with secret details"))
            }
        }
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        self.record(request);
        let items: Vec<Result<String>> = match &self.behavior {
            ChatBehavior::Fragments(fragments) => fragments.iter().cloned().map(Ok).collect(),
            ChatBehavior::Grounded => Self::grounded_answer(request).into_iter().map(Ok).collect(),
            ChatBehavior::Fail => {
                return Err(Error::generation("upstream returned HTTP 500 with secret details"))
            }
            ChatBehavior::FailAfter(fragments) => fragments
                .iter()
                .cloned()
                .map(Ok)
                .chain(std::iter::once(Err(Error::generation("connection reset"))))
                .collect(),
        };
        Ok(Box::pin(stream::iter(items)))
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

