//! Grounded answer generation on top of a chat model

use futures::{stream, StreamExt};
use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::providers::{ChatModel, CompletionRequest, FragmentStream};

use super::prompt::{PromptBuilder, NOT_IN_DOCS};

/// Builds grounded prompts, calls the chat model and normalizes its output
#[derive(Clone)]
pub struct CompletionProvider {
    chat: Arc<dyn ChatModel>,
    prompts: PromptBuilder,
    temperature: f32,
    max_tokens: u32,
}

/// Forwarding state for a streamed completion
struct Forwarder {
    fragments: FragmentStream,
    /// Non-whitespace text has been forwarded
    started: bool,
    /// Trailing whitespace held back until more text follows
    pending: String,
    finished: bool,
}

/// Keep availability errors as they are, everything else is a generation failure
fn classify(err: Error) -> Error {
    match err {
        e @ (Error::ServiceUnavailable(_) | Error::Generation(_)) => e,
        other => Error::generation(other.to_string()),
    }
}

impl CompletionProvider {
    pub fn new(chat: Arc<dyn ChatModel>, config: &GenerationConfig) -> Self {
        tracing::info!(
            "Completion provider using {} (model: {}, temperature: {}, max tokens: {})",
            chat.name(),
            chat.model(),
            config.temperature,
            config.max_tokens
        );
        Self {
            chat,
            prompts: PromptBuilder::new(config.domain.clone()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Whether the chat model has credentials
    pub fn is_available(&self) -> bool {
        self.chat.is_available()
    }

    /// Two-message request for the given inputs
    pub fn build_request(
        &self,
        query: &str,
        contexts: &[String],
        sources: &[String],
    ) -> CompletionRequest {
        CompletionRequest {
            messages: self.prompts.build_messages(query, contexts, sources),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Generate the complete answer
    ///
    /// Returns the trimmed completion, or `NOT_IN_DOCS` when the model
    /// returned no content.
    pub async fn generate(
        &self,
        query: &str,
        contexts: &[String],
        sources: &[String],
    ) -> Result<String> {
        let request = self.build_request(query, contexts, sources);

        let text = self.chat.complete(&request).await.map_err(|e| {
            tracing::error!("Error generating response: {}", e);
            classify(e)
        })?;

        let text = text.trim();
        if text.is_empty() {
            Ok(NOT_IN_DOCS.to_string())
        } else {
            Ok(text.to_string())
        }
    }

    /// Generate the answer as a stream of fragments
    ///
    /// The concatenated fragments equal what `generate` returns for the same
    /// completion: leading whitespace is dropped, trailing whitespace is held
    /// back until more text follows, and a completion with no text yields a
    /// single `NOT_IN_DOCS` fragment. An upstream failure arrives as a final
    /// `Err` item.
    pub async fn generate_stream(
        &self,
        query: &str,
        contexts: &[String],
        sources: &[String],
    ) -> Result<FragmentStream> {
        let request = self.build_request(query, contexts, sources);

        let fragments = self.chat.complete_stream(&request).await.map_err(|e| {
            tracing::error!("Error starting streaming response: {}", e);
            classify(e)
        })?;

        let forwarder = Forwarder {
            fragments,
            started: false,
            pending: String::new(),
            finished: false,
        };

        let forwarded = stream::unfold(forwarder, |mut f| async move {
            if f.finished {
                return None;
            }
            loop {
                match f.fragments.next().await {
                    Some(Ok(text)) => {
                        let text = if f.started { text.as_str() } else { text.trim_start() };
                        let body = text.trim_end();
                        if body.is_empty() {
                            if f.started {
                                f.pending.push_str(text);
                            }
                            continue;
                        }
                        f.started = true;
                        let mut out = std::mem::take(&mut f.pending);
                        out.push_str(body);
                        f.pending.push_str(&text[body.len()..]);
                        return Some((Ok(out), f));
                    }
                    Some(Err(e)) => {
                        f.finished = true;
                        return Some((Err(classify(e)), f));
                    }
                    None => {
                        f.finished = true;
                        if f.started {
                            return None;
                        }
                        return Some((Ok(NOT_IN_DOCS.to_string()), f));
                    }
                }
            }
        });

        Ok(Box::pin(forwarded))
    }
}
