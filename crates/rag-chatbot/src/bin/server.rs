//! Chat server binary
//!
//! Run with: cargo run -p rag-chatbot --bin rag-chatbot-server

use rag_chatbot::{config::RagConfig, server::RagServer};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_chatbot=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                       RAG Chatbot API                     ║
║          Grounded answers from your document index        ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration (optional TOML file, then environment)
    let config_path = std::env::var("RAG_CONFIG").ok();
    let config = RagConfig::load(config_path.as_deref().map(Path::new))?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.openai.embedding_model);
    tracing::info!("  - Chat model: {}", config.openai.chat_model);
    tracing::info!("  - Pinecone index: {}", config.pinecone.index_name);
    tracing::info!("  - Top K: {}", config.retrieval.top_k);

    if config.openai.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will return 503");
    }
    if config.pinecone.api_key.is_none() {
        tracing::warn!("PINECONE_API_KEY is not set; chat requests will return 503");
    }

    // Create and start server
    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /chat         - Ask a question");
    println!("  POST /chat/stream  - Ask a question (server-sent events)");
    println!("  GET  /ready        - Readiness check");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
