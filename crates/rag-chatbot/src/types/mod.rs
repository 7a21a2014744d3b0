//! Core types for the chatbot

pub mod query;
pub mod response;

pub use query::{ChatRequest, Query, DEFAULT_CONVERSATION_ID};
pub use response::{
    AnswerEnvelope, EnvironmentInfo, HealthStatus, RetrievalResult, RetrievedMatch, StreamEvent,
};
