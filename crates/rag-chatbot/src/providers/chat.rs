//! Chat completion capability used for answer generation

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;

/// Lazy, single-pass sequence of text fragments
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Completion request handed to a chat model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Messages in order
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum completion tokens
    pub max_tokens: u32,
}

/// Trait for chat completion backends
///
/// Implementations:
/// - `OpenAiChat`: OpenAI chat completions API (gpt-4o-mini)
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete the request and return the full text (may be empty)
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Complete the request in incremental-delivery mode
    ///
    /// Every call issues a new upstream request. Fragments are yielded in
    /// generation order; an `Err` item ends the stream.
    async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream>;

    /// Whether credentials were supplied at construction
    fn is_available(&self) -> bool;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
