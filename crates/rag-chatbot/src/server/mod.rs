//! HTTP server for the chatbot

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Chat HTTP server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a new server with providers built from the configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Create a server around existing state
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    fn config(&self) -> &RagConfig {
        self.state.config()
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .config()
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        routes::routes()
            .with_state(self.state.clone())
            // Middleware layers (applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(self.cors_layer())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting chat server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config().server.host, self.config().server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::NOT_IN_DOCS;
    use crate::testing::{hit, MockChat, MockEmbedder, MockIndex};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn server(index: MockIndex, chat: MockChat) -> RagServer {
        RagServer::with_state(AppState::with_providers(
            RagConfig::default(),
            Arc::new(MockEmbedder::new(4)),
            Arc::new(index),
            Arc::new(chat),
        ))
    }

    fn cgt_index() -> MockIndex {
        MockIndex::with_matches(vec![hit(
            "1",
            0.93,
            Some("CGT = Sale Proceeds - Cost Base"),
            Some("doc1"),
        )])
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_envelope() {
        let router = server(MockIndex::empty(), MockChat::grounded()).router();

        let response = router
            .oneshot(post_json("/chat", json!({"message": "What is ScaleApp?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            json!({"response": NOT_IN_DOCS, "sources": [], "conversation_id": "default"})
        );
    }

    #[tokio::test]
    async fn test_chat_echoes_conversation_id() {
        let router = server(cgt_index(), MockChat::grounded()).router();

        let response = router
            .oneshot(post_json(
                "/chat",
                json!({"message": "How do I calculate CGT?", "conversation_id": "abc"}),
            ))
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["conversation_id"], "abc");
        assert!(body["response"].as_str().unwrap().contains("Cost Base"));
        assert_eq!(body["sources"], json!([]));
    }

    #[tokio::test]
    async fn test_chat_unavailable_is_503() {
        let router = server(MockIndex::unavailable(), MockChat::grounded()).router();

        let response = router
            .oneshot(post_json("/chat", json!({"message": "q"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("PINECONE_API_KEY"));
    }

    #[tokio::test]
    async fn test_chat_failure_hides_details() {
        let router = server(cgt_index(), MockChat::failing()).router();

        let response = router
            .oneshot(post_json("/chat", json!({"message": "q"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_text(response).await;
        assert!(text.contains("Internal server error"));
        assert!(!text.contains("secret"));
    }

    #[tokio::test]
    async fn test_chat_rejects_missing_message() {
        let router = server(MockIndex::empty(), MockChat::grounded()).router();

        let response = router
            .oneshot(post_json("/chat", json!({"conversation_id": "abc"})))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_chat_stream_emits_sse_events() {
        let router = server(cgt_index(), MockChat::streaming(vec!["Cost", " base"])).router();

        let response = router
            .oneshot(post_json("/chat/stream", json!({"message": "q"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );
        let text = body_text(response).await;
        assert_eq!(
            text,
            "data: {\"chunk\":\"Cost\"}\n\ndata: {\"chunk\":\" base\"}\n\ndata: {\"done\":true}\n\n"
        );
    }

    #[tokio::test]
    async fn test_chat_stream_unavailable_is_in_band() {
        let router = server(MockIndex::unavailable(), MockChat::grounded()).router();

        let response = router
            .oneshot(post_json("/chat/stream", json!({"message": "q"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.starts_with("data: {\"error\":"));
        assert!(text.contains("PINECONE_API_KEY"));
        assert!(!text.contains("\"done\""));
    }

    #[tokio::test]
    async fn test_health_reports_flags() {
        let router = server(MockIndex::unavailable(), MockChat::grounded()).router();

        let response = router.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["pinecone_connected"], false);
        assert_eq!(body["openai_connected"], true);
        assert!(body["environment"]["version"].is_string());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_ready_follows_availability() {
        let ready = server(MockIndex::empty(), MockChat::grounded()).router();
        let not_ready = server(MockIndex::unavailable(), MockChat::grounded()).router();

        assert_eq!(ready.oneshot(get("/ready")).await.unwrap().status(), StatusCode::OK);
        assert_eq!(
            not_ready.oneshot(get("/ready")).await.unwrap().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_service_info() {
        let router = server(MockIndex::empty(), MockChat::grounded()).router();

        let response = router.oneshot(get("/")).await.unwrap();

        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["framework"], "axum");
        assert!(body["endpoints"]["POST /chat/stream"].is_string());
    }

    #[tokio::test]
    async fn test_bind_failure_is_internal_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = RagConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = taken.local_addr().unwrap().port();

        let server = RagServer::with_state(AppState::with_providers(
            config,
            Arc::new(MockEmbedder::new(4)),
            Arc::new(MockIndex::empty()),
            Arc::new(MockChat::grounded()),
        ));

        let err = server.start().await.unwrap_err();
        assert!(matches!(err, Error::Internal(ref m) if m.contains("Failed to bind")));
    }

    #[test]
    fn test_address_from_config() {
        let server = server(MockIndex::empty(), MockChat::grounded());
        assert_eq!(server.address(), "0.0.0.0:3005");
    }
}
