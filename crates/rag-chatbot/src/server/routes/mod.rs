//! API routes for the chat server

pub mod chat;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::info))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/chat", post(chat::chat))
        .route("/chat/stream", post(chat::chat_stream))
}
