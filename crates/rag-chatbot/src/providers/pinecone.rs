//! Pinecone vector index over the REST API
//!
//! Queries go to the index's data-plane host. When the host is not configured
//! it is looked up once through the control plane and reused afterwards.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::PineconeConfig;
use crate::error::{Error, Result};

use super::vector_index::{IndexMatch, VectorIndex};

/// Pinecone index client
pub struct PineconeIndex {
    /// HTTP client
    client: Client,
    /// API key; `None` when not configured
    api_key: Option<String>,
    /// Configuration
    config: PineconeConfig,
    /// Data-plane base URL (`https://<host>`)
    host: OnceCell<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

impl PineconeIndex {
    /// Create a new Pinecone client; a missing key leaves it unavailable
    pub fn new(config: &PineconeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_some() {
            tracing::info!(
                "Pinecone client initialized successfully (index: {})",
                config.index_name
            );
        } else {
            tracing::warn!("PINECONE_API_KEY not found in environment variables");
        }

        let host = match config.index_host.as_deref().filter(|h| !h.trim().is_empty()) {
            Some(host) => OnceCell::new_with(Some(normalize_host(host))),
            None => OnceCell::new(),
        };

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
            host,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::unavailable("Pinecone service not initialized. Check PINECONE_API_KEY.")
        })
    }

    /// Data-plane URL of the configured index
    async fn host(&self) -> Result<&str> {
        self.host
            .get_or_try_init(|| self.describe_index_host())
            .await
            .map(String::as_str)
    }

    async fn describe_index_host(&self) -> Result<String> {
        let url = format!(
            "{}/indexes/{}",
            self.config.control_plane_url.trim_end_matches('/'),
            self.config.index_name
        );

        let response = self
            .client
            .get(&url)
            .header("Api-Key", self.api_key()?)
            .send()
            .await
            .map_err(|e| Error::vector_index(format!("Describe index request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_index(format!(
                "Describe index '{}' failed: HTTP {} - {}",
                self.config.index_name, status, body
            )));
        }

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_index(format!("Failed to parse index description: {}", e)))?;

        tracing::info!("Resolved Pinecone index host: {}", described.host);
        Ok(normalize_host(&described.host))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        let api_key = self.api_key()?;
        let url = format!("{}/query", self.host().await?);

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_index(format!("Query request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_index(format!(
                "Query failed: HTTP {} - {}",
                status, body
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_index(format!("Failed to parse query response: {}", e)))?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
