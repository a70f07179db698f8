use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::search::OutputFormat;
use crate::error::ConfigError;

pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_PINECONE_ENVIRONMENT: &str = "asia-southeast1-gcp-free";
pub const DEFAULT_INDEX_NAME: &str = "openai";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";
pub const PINECONE_ENVIRONMENT_VAR: &str = "PINECONE_ENVIRONMENT";
pub const QDRANT_API_KEY_VAR: &str = "QDRANT_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("opstack").join("config.toml"))
    }

    /// Load the user config file, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indexing.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "indexing.batch_size must be at least 1".to_string(),
            ));
        }
        if self.search.default_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "search.default_top_k must be at least 1".to_string(),
            ));
        }
        if self.vector_store.index.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "vector_store.index cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Vector index backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorDriver {
    #[default]
    Pinecone,
    Qdrant,
}

impl std::fmt::Display for VectorDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorDriver::Pinecone => write!(f, "pinecone"),
            VectorDriver::Qdrant => write!(f, "qdrant"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub driver: VectorDriver,

    /// Pinecone index name or Qdrant collection name.
    #[serde(default = "default_index_name")]
    pub index: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    /// Explicit data-plane host; skips project lookup when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_environment() -> String {
    DEFAULT_PINECONE_ENVIRONMENT.to_string()
}

fn default_qdrant_url() -> String {
    DEFAULT_QDRANT_URL.to_string()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            driver: VectorDriver::default(),
            index: default_index_name(),
            environment: default_environment(),
            host: None,
            qdrant_url: default_qdrant_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_batch_size() -> u32 {
    32
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: u32,

    #[serde(default)]
    pub default_format: OutputFormat,
}

fn default_top_k() -> u32 {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            default_format: OutputFormat::Text,
        }
    }
}

/// Provider secrets, read from the process environment only.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub index_api_key: Option<String>,
    pub environment: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("index_api_key", &self.index_api_key.as_ref().map(|_| "<redacted>"))
            .field("environment", &self.environment)
            .finish()
    }
}

impl Credentials {
    /// Read credentials for the given driver from the process environment.
    pub fn from_env(driver: VectorDriver) -> Result<Self, ConfigError> {
        Self::from_lookup(driver, |name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(driver: VectorDriver, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let openai_api_key =
            get(OPENAI_API_KEY_VAR).ok_or(ConfigError::MissingCredential(OPENAI_API_KEY_VAR))?;

        let (index_api_key, environment) = match driver {
            VectorDriver::Pinecone => (
                Some(
                    get(PINECONE_API_KEY_VAR)
                        .ok_or(ConfigError::MissingCredential(PINECONE_API_KEY_VAR))?,
                ),
                get(PINECONE_ENVIRONMENT_VAR),
            ),
            VectorDriver::Qdrant => (get(QDRANT_API_KEY_VAR), None),
        };

        Ok(Self {
            openai_api_key,
            index_api_key,
            environment,
        })
    }
}
