//! rag-chatbot: Retrieval-augmented chatbot API
//!
//! Answers questions from a vector index of documents. Each question is
//! embedded, the closest passages are fetched from Pinecone, and an OpenAI
//! chat model writes an answer grounded only in those passages, either in
//! one response or streamed as server-sent events.

pub mod config;
pub mod error;
pub mod generation;
pub mod orchestrator;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use orchestrator::{Availability, EventStream, RagOrchestrator};
pub use types::{
    query::{ChatRequest, Query},
    response::{AnswerEnvelope, StreamEvent},
};
