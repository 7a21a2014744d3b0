//! Response types for chat queries

use serde::{Deserialize, Serialize};

use super::query::Query;

/// A single index hit that carried text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMatch {
    /// Fragment text
    pub text: String,
    /// Source label (`Doc_<id>` when the record has none)
    pub source: String,
    /// Similarity score reported by the index
    pub score: f32,
}

/// Contexts and their sources, index-aligned, in index order
///
/// The fields are private so the two sequences can only be built together
/// and always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    contexts: Vec<String>,
    sources: Vec<String>,
}

impl RetrievalResult {
    /// Result with no context, a valid outcome for an empty or unreachable index
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append one match
    pub fn push(&mut self, matched: RetrievedMatch) {
        self.contexts.push(matched.text);
        self.sources.push(matched.source);
    }

    /// Retrieved fragment texts
    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// Source labels, `sources()[i]` belongs to `contexts()[i]`
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl FromIterator<RetrievedMatch> for RetrievalResult {
    fn from_iter<I: IntoIterator<Item = RetrievedMatch>>(iter: I) -> Self {
        let mut result = Self::empty();
        for matched in iter {
            result.push(matched);
        }
        result
    }
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    /// Bot response message
    pub response: String,
    /// Always empty: sources are listed inline in `response`
    pub sources: Vec<String>,
    /// Echoed conversation ID
    pub conversation_id: String,
}

impl AnswerEnvelope {
    /// Wrap a generated answer for the given query
    pub fn new(response: String, query: &Query) -> Self {
        Self {
            response,
            sources: Vec::new(),
            conversation_id: query.conversation_id.clone(),
        }
    }
}

/// One event of a streamed answer
///
/// Serializes to exactly one of `{"chunk": ..}`, `{"done": true}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Text fragment
    Chunk(String),
    /// Terminal success
    Done,
    /// Terminal failure with a caller-safe message
    Error(String),
}

#[derive(Serialize)]
#[serde(untagged)]
enum StreamEventWire<'a> {
    Chunk { chunk: &'a str },
    Done { done: bool },
    Error { error: &'a str },
}

impl Serialize for StreamEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            StreamEvent::Chunk(chunk) => StreamEventWire::Chunk { chunk },
            StreamEvent::Done => StreamEventWire::Done { done: true },
            StreamEvent::Error(error) => StreamEventWire::Error { error },
        };
        wire.serialize(serializer)
    }
}

/// Body returned by `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Vector index credentials present
    pub pinecone_connected: bool,
    /// Embedding/chat credentials present
    pub openai_connected: bool,
    pub environment: EnvironmentInfo,
}

/// Build information reported by `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Crate version
    pub version: String,
    /// Target operating system
    pub platform: String,
}

impl EnvironmentInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}
