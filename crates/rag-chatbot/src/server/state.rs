//! Application state for the chat server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::CompletionProvider;
use crate::orchestrator::{Availability, RagOrchestrator};
use crate::providers::{
    openai::OpenAiProvider, pinecone::PineconeIndex, ChatModel, EmbeddingProvider, VectorIndex,
};
use crate::retrieval::VectorIndexGateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Question answering pipeline
    orchestrator: RagOrchestrator,
}

impl AppState {
    /// Create application state with the OpenAI and Pinecone providers
    ///
    /// Missing credentials do not fail construction; the affected provider
    /// reports itself unavailable instead.
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing chat application state...");

        let (embedder, chat) = OpenAiProvider::new(&config.openai)?.split();
        let index = PineconeIndex::new(&config.pinecone)?;

        let state = Self::with_providers(config, Arc::new(embedder), Arc::new(index), Arc::new(chat));

        let availability = state.availability();
        tracing::info!(
            "Providers initialized (openai: {}, pinecone: {})",
            availability.openai,
            availability.pinecone
        );

        Ok(state)
    }

    /// Create application state from already constructed providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        let retriever = VectorIndexGateway::new(index, config.retrieval.top_k);
        let completion = CompletionProvider::new(chat, &config.generation);
        let orchestrator = RagOrchestrator::new(embedder, retriever, completion);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the question answering pipeline
    pub fn orchestrator(&self) -> &RagOrchestrator {
        &self.inner.orchestrator
    }

    /// Provider availability
    pub fn availability(&self) -> Availability {
        self.inner.orchestrator.availability()
    }

    /// Check if every provider is ready to serve
    pub fn is_ready(&self) -> bool {
        self.availability().all()
    }
}
