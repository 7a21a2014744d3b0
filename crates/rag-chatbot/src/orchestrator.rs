//! End-to-end question answering pipeline
//!
//! Every call runs `availability check -> embed -> retrieve -> generate` in
//! order. Availability failures reach the caller unchanged; any other failure
//! is logged and replaced by a generic internal error.

use futures::{stream, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::CompletionProvider;
use crate::providers::{EmbeddingProvider, FragmentStream};
use crate::retrieval::VectorIndexGateway;
use crate::types::{AnswerEnvelope, Query, RetrievalResult, StreamEvent};

/// Lazy sequence of stream events ending in exactly one terminal event
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Credential state of the providers, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Embedding and chat credentials present
    pub openai: bool,
    /// Vector index credentials present
    pub pinecone: bool,
}

impl Availability {
    pub fn all(&self) -> bool {
        self.openai && self.pinecone
    }
}

/// Composes embedding, retrieval and generation
#[derive(Clone)]
pub struct RagOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: VectorIndexGateway,
    completion: CompletionProvider,
}

/// Keep classified errors, collapse everything else to an internal error
fn abort(err: Error) -> Error {
    if err.is_classified() {
        err
    } else {
        Error::internal(err.to_string())
    }
}

/// Frame fragments as chunk events followed by one terminal event
fn fragment_events(fragments: FragmentStream) -> EventStream {
    let events = stream::unfold(Some(fragments), |state| async move {
        let mut fragments = state?;
        match fragments.next().await {
            Some(Ok(text)) => Some((StreamEvent::Chunk(text), Some(fragments))),
            Some(Err(e)) => {
                tracing::error!("Error processing streaming message: {}", e);
                Some((StreamEvent::Error(abort(e).public_message()), None))
            }
            None => Some((StreamEvent::Done, None)),
        }
    });
    Box::pin(events)
}

impl RagOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: VectorIndexGateway,
        completion: CompletionProvider,
    ) -> Self {
        Self {
            embedder,
            retriever,
            completion,
        }
    }

    /// Provider availability, a read of construction-time state
    pub fn availability(&self) -> Availability {
        Availability {
            openai: self.embedder.is_available() && self.completion.is_available(),
            pinecone: self.retriever.is_available(),
        }
    }

    fn check_availability(&self) -> Result<()> {
        let availability = self.availability();
        if !availability.pinecone {
            return Err(Error::unavailable(
                "Pinecone service not initialized. Check PINECONE_API_KEY.",
            ));
        }
        if !availability.openai {
            return Err(Error::unavailable(
                "OpenAI service not initialized. Check OPENAI_API_KEY.",
            ));
        }
        Ok(())
    }

    /// Availability check, embedding and retrieval
    async fn retrieve(&self, query: &Query) -> Result<RetrievalResult> {
        self.check_availability()?;

        tracing::debug!("Embedding query with {}", self.embedder.name());
        let vector = self.embedder.embed(&query.text).await?;
        let retrieval = self.retriever.search(&vector).await;

        tracing::debug!(
            "Retrieved {} contexts for conversation {}",
            retrieval.len(),
            query.conversation_id
        );
        Ok(retrieval)
    }

    async fn run(&self, query: &Query) -> Result<AnswerEnvelope> {
        let retrieval = self.retrieve(query).await?;
        let response = self
            .completion
            .generate(&query.text, retrieval.contexts(), retrieval.sources())
            .await?;
        Ok(AnswerEnvelope::new(response, query))
    }

    /// Answer a query in one piece
    pub async fn answer(&self, query: &Query) -> Result<AnswerEnvelope> {
        tracing::info!("Processing message: {}", query.text);

        self.run(query).await.map_err(|e| {
            tracing::error!("Error processing message: {}", e);
            abort(e)
        })
    }

    /// Answer a query as a stream of events
    ///
    /// Nothing runs until the stream is first polled. Failures, including
    /// unavailable providers, arrive in-band as a single `Error` event.
    /// Dropping the stream releases the upstream completion stream.
    pub fn answer_stream(&self, query: Query) -> EventStream {
        let this = self.clone();

        let started = async move {
            tracing::info!("Processing streaming message: {}", query.text);
            let retrieval = this.retrieve(&query).await?;
            this.completion
                .generate_stream(&query.text, retrieval.contexts(), retrieval.sources())
                .await
        };

        let events = stream::once(started).flat_map(|started| match started {
            Ok(fragments) => fragment_events(fragments),
            Err(e) => {
                tracing::error!("Error processing streaming message: {}", e);
                let event = StreamEvent::Error(abort(e).public_message());
                Box::pin(stream::iter([event])) as EventStream
            }
        });

        Box::pin(events)
    }
}
