//! Configuration for the chatbot service
//!
//! Values come from built-in defaults, an optional TOML file, and finally the
//! process environment. Missing credentials never fail loading; they leave the
//! corresponding provider unavailable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// OpenAI embedding and chat configuration
    pub openai: OpenAiConfig,
    /// Pinecone index configuration
    pub pinecone: PineconeConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Answer generation configuration
    pub generation: GenerationConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then overlay the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text; absent sections fall back to defaults
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Overlay environment variables using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(key) = get("PINECONE_API_KEY") {
            self.pinecone.api_key = Some(key);
        }
        if let Some(name) = get("PINECONE_INDEX_NAME") {
            self.pinecone.index_name = name;
        }
        if let Some(host) = get("PINECONE_INDEX_HOST") {
            self.pinecone.index_host = Some(host);
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3005,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://frontend:3000".to_string(),
            ],
        }
    }
}

/// OpenAI configuration (embeddings and chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; `None` leaves both OpenAI providers unavailable
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Embedding model name
    pub embedding_model: String,
    /// Chat model name
    pub chat_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Pinecone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    /// API key; `None` leaves the index unavailable
    pub api_key: Option<String>,
    /// Index name
    pub index_name: String,
    /// Data-plane host of the index; resolved from the control plane when unset
    pub index_host: Option<String>,
    /// Control-plane URL used to resolve the index host
    pub control_plane_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: "default".to_string(),
            index_host: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest neighbours requested from the index
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature (low for grounded answers)
    pub temperature: f32,
    /// Maximum completion tokens
    pub max_tokens: u32,
    /// Subject area the assistant answers about; anything else is `UNRELATED`
    pub domain: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 600,
            domain: "ScaleApp Academy and ScaleApp Docs, covering property investment and finance topics"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.server.port, 3005);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.pinecone.index_name, "default");
        assert!(config.openai.api_key.is_none());
        assert!(config.generation.temperature <= 0.2);
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("PINECONE_API_KEY", "pc-test"),
            ("PINECONE_INDEX_NAME", "docs"),
            ("PORT", "9000"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.pinecone.api_key.as_deref(), Some("pc-test"));
        assert_eq!(config.pinecone.index_name, "docs");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_empty_env_values_are_absent() {
        let mut config = RagConfig::default();
        config.apply_env(|key| (key == "OPENAI_API_KEY").then(|| "  ".to_string()));
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = RagConfig::from_toml(
            r#"
            [retrieval]
            top_k = 8

            [generation]
            temperature = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.generation.max_tokens, 600);
        assert_eq!(config.server.port, 3005);
    }
}
