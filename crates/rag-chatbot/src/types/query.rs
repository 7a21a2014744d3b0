//! Chat request types

use serde::{Deserialize, Serialize};

/// Conversation ID used when the caller sends none
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Body of `POST /chat` and `POST /chat/stream`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message to send to the chatbot
    pub message: String,

    /// Optional conversation ID echoed back to the caller
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// A question as seen by the pipeline
///
/// The conversation ID is an opaque tag; no history is stored against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The question text
    pub text: String,
    /// Conversation tag
    pub conversation_id: String,
}

impl Query {
    /// Create a query with the default conversation ID
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation_id: DEFAULT_CONVERSATION_ID.to_string(),
        }
    }

    /// Set the conversation ID
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }
}

impl From<ChatRequest> for Query {
    fn from(request: ChatRequest) -> Self {
        Self {
            text: request.message,
            conversation_id: request
                .conversation_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string()),
        }
    }
}
