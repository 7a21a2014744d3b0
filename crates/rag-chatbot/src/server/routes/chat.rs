//! Chat endpoints, one-shot and streaming

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;

use crate::error::{Result, INTERNAL_ERROR_MESSAGE};
use crate::server::state::AppState;
use crate::types::{AnswerEnvelope, ChatRequest, Query, StreamEvent};

/// POST /chat - Answer a message in one response
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AnswerEnvelope>> {
    let query = Query::from(request);
    let envelope = state.orchestrator().answer(&query).await?;
    Ok(Json(envelope))
}

/// POST /chat/stream - Answer a message as server-sent events
///
/// Every event is `data: <json>` carrying a chunk, the done marker or an
/// error. Availability failures are reported in-band like any other error.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let events = state.orchestrator().answer_stream(Query::from(request));
    Sse::new(events.map(|event| Ok(to_sse_event(&event))))
}

fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        tracing::error!("Failed to encode stream event: {}", e);
        Event::default().data(format!(r#"{{"error":"{}"}}"#, INTERNAL_ERROR_MESSAGE))
    })
}

