//! Application configuration.
//!
//! A typed config loaded from an optional TOML file with serde defaults for
//! every field, so a bare checkout runs with no config at all. Secrets are
//! never stored here: the API key comes from the environment (optionally via
//! a `.env` file loaded at startup).

pub mod paths;

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use paths::AppPaths;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    pub chat_model: String,
    pub embed_model: String,
    pub temperature: f64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks fed into the answer prompt.
    pub top_k: usize,
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Cap on the stuffed context passed to the model.
    pub max_context_chars: usize,
    /// Embedding batch size during index builds.
    pub embed_batch_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "RefDesk".to_string(),
            llm: LlmConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            temperature: 0.5,
            request_timeout_secs: 60,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            chunk_size: 500,
            chunk_overlap: 50,
            max_context_chars: 4000,
            embed_batch_size: 32,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. A present-but-broken file is an error: silently
    /// ignoring it would boot the service with settings the operator did not
    /// choose.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path).map_err(ApiError::internal)?;
            toml::from_str::<AppConfig>(&contents).map_err(|e| {
                ApiError::BadRequest(format!("invalid config file {}: {}", path.display(), e))
            })?
        } else {
            AppConfig::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.retrieval.top_k == 0 {
            return Err(ApiError::BadRequest(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.retrieval.chunk_size <= self.retrieval.chunk_overlap {
            return Err(ApiError::BadRequest(
                "retrieval.chunk_size must be larger than retrieval.chunk_overlap".to_string(),
            ));
        }
        if self.retrieval.embed_batch_size == 0 {
            return Err(ApiError::BadRequest(
                "retrieval.embed_batch_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ApiError::BadRequest(
                "llm.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }

    /// API key for the OpenAI-compatible endpoint, from the environment.
    pub fn api_key() -> Option<String> {
        env::var("OPENAI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
