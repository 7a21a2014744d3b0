//! Provider abstractions for embeddings, chat completions and vector search
//!
//! The pipeline only sees the traits; the OpenAI and Pinecone clients are the
//! production implementations and tests substitute deterministic doubles.

pub mod chat;
pub mod embedding;
pub mod event_stream;
pub mod openai;
pub mod pinecone;
pub mod vector_index;

pub use chat::{ChatMessage, ChatModel, ChatRole, CompletionRequest, FragmentStream};
pub use embedding::EmbeddingProvider;
pub use vector_index::{IndexMatch, VectorIndex};
