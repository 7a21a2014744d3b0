//! OpenAI-based providers for embeddings and chat completions
//!
//! A single `OpenAiClient` is shared by the embedder and the chat model, the
//! same way one API key backs both capabilities.

use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::chat::{ChatMessage, ChatModel, CompletionRequest, FragmentStream};
use super::embedding::EmbeddingProvider;
use super::event_stream::EventStreamDecoder;

/// OpenAI REST client
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API key; `None` when not configured
    api_key: Option<String>,
    /// Configuration
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Decoded `data:` payload of a streamed completion
#[derive(Debug, PartialEq)]
enum ChunkPayload {
    /// Incremental text (may be empty)
    Delta(String),
    /// `[DONE]` marker
    Done,
}

fn parse_chunk_payload(payload: &str) -> Result<ChunkPayload> {
    let payload = payload.trim();
    if payload == "[DONE]" {
        return Ok(ChunkPayload::Done);
    }

    let chunk: CompletionChunk = serde_json::from_str(payload)
        .map_err(|e| Error::generation(format!("Failed to parse stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(Error::generation(format!("Stream error: {}", error.message)));
    }

    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default();

    Ok(ChunkPayload::Delta(text))
}

/// Reader state for turning an SSE body into text fragments
struct DeltaReader<S> {
    body: S,
    decoder: EventStreamDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turn a streamed chat completion body into non-empty text fragments
///
/// Pulls from `body` only when the consumer asks for the next fragment and
/// stops at `[DONE]`, at the end of the body, or after the first error.
/// Dropping the returned stream drops `body`.
fn delta_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let reader = DeltaReader {
        body,
        decoder: EventStreamDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    let fragments = stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(payload) = reader.pending.pop_front() {
                match parse_chunk_payload(&payload) {
                    Ok(ChunkPayload::Delta(text)) if text.is_empty() => continue,
                    Ok(ChunkPayload::Delta(text)) => return Some((Ok(text), reader)),
                    Ok(ChunkPayload::Done) => return None,
                    Err(e) => {
                        reader.pending.clear();
                        reader.finished = true;
                        return Some((Err(e), reader));
                    }
                }
            }

            if reader.finished {
                return None;
            }

            match reader.body.next().await {
                Some(Ok(bytes)) => {
                    let payloads = reader.decoder.push(bytes.as_ref());
                    reader.pending.extend(payloads);
                }
                Some(Err(e)) => {
                    reader.finished = true;
                    return Some((Err(Error::generation(format!("Stream error: {}", e))), reader));
                }
                None => {
                    reader.finished = true;
                    if let Some(tail) = reader.decoder.finish() {
                        reader.pending.push_back(tail);
                    }
                }
            }
        }
    });

    Box::pin(fragments)
}

impl OpenAiClient {
    /// Create a new OpenAI client; a missing key leaves it unavailable
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_some() {
            tracing::info!("OpenAI client initialized successfully");
        } else {
            tracing::warn!("OPENAI_API_KEY not found in environment variables");
        }

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    /// Whether an API key was supplied
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::unavailable("OpenAI service not initialized. Check OPENAI_API_KEY.")
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Generate an embedding for one text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self.api_key()?;
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(self.url("embeddings"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Embedding failed: HTTP {} - {}",
                status, body
            )));
        }

        let embed_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::embedding("No embedding in response"))
    }

    async fn send_completion(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let api_key = self.api_key()?;
        let body = ChatCompletionRequest {
            model: &self.config.chat_model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        };

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Completion failed: HTTP {} - {}",
                status, body
            )));
        }

        Ok(response)
    }

    /// Run a chat completion and return the raw message content
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        tracing::info!("Generating answer with model: {}", self.config.chat_model);

        let response = self.send_completion(request, false).await?;
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse completion response: {}", e)))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Run a chat completion with `stream: true`
    pub async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        tracing::info!("Streaming answer with model: {}", self.config.chat_model);

        let response = self.send_completion(request, true).await?;
        Ok(delta_stream(Box::pin(response.bytes_stream())))
    }
}

/// OpenAI embedding provider
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
}

impl OpenAiEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await.map_err(|e| {
            tracing::error!("Error generating embeddings: {}", e);
            match e {
                e @ (Error::ServiceUnavailable(_) | Error::Embedding(_)) => e,
                other => Error::embedding(other.to_string()),
            }
        })
    }

    fn is_available(&self) -> bool {
        self.client.is_available()
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// OpenAI chat model
pub struct OpenAiChat {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiChat {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>) -> Self {
        let model = client.config.chat_model.clone();
        Self { client, model }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.client.complete(request).await
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        self.client.complete_stream(request).await
    }

    fn is_available(&self) -> bool {
        self.client.is_available()
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Embedder and chat model sharing one OpenAI client
pub struct OpenAiProvider {
    embedder: OpenAiEmbedder,
    chat: OpenAiChat,
}

impl OpenAiProvider {
    /// Create a new combined OpenAI provider
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(config)?);
        Ok(Self {
            embedder: OpenAiEmbedder::from_client(Arc::clone(&client)),
            chat: OpenAiChat::from_client(client),
        })
    }

    /// Split into separate providers
    pub fn split(self) -> (OpenAiEmbedder, OpenAiChat) {
        (self.embedder, self.chat)
    }
}
