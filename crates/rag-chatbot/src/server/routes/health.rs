//! Health, readiness and service info endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::server::state::AppState;
use crate::types::{EnvironmentInfo, HealthStatus};

/// GET /health - Liveness with provider availability
///
/// Always `healthy` while the process serves requests; the flags report
/// whether credentials were present at startup.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let availability = state.availability();
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        pinecone_connected: availability.pinecone,
        openai_connected: availability.openai,
        environment: EnvironmentInfo::current(),
    })
}

/// GET /ready - 200 once every provider is available
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET / - Service info
pub async fn info() -> Json<Value> {
    Json(json!({
        "message": "RAG Chatbot API",
        "version": env!("CARGO_PKG_VERSION"),
        "framework": "axum",
        "endpoints": {
            "POST /chat": "Answer a message from the indexed documents",
            "POST /chat/stream": "Answer a message as server-sent events",
            "GET /health": "Liveness and provider availability",
            "GET /ready": "Readiness (503 until every provider is configured)"
        }
    }))
}
