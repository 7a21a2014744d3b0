//! Answer generation with a chat model

pub mod completion;
pub mod prompt;

pub use completion::CompletionProvider;
pub use prompt::{PromptBuilder, NOT_IN_DOCS, NO_CONTEXT_MARKER, UNRELATED};
