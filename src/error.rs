//! Error types for the embed-and-query CLI.

use thiserror::Error;

use crate::utils::retry::Retryable;

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding provider: {0}")]
    ConnectionError(String),

    #[error("embedding provider error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding timeout")]
    Timeout,
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::ConnectionError(_) | EmbeddingError::Timeout => true,
            // Rate limits and gateway failures are worth another attempt
            EmbeddingError::ServerError(msg) => is_transient_message(msg),
            EmbeddingError::RequestError(e) => e.is_timeout() || e.is_connect(),
            EmbeddingError::InvalidResponse(_) => false,
        }
    }
}

/// Errors related to vector index operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to vector index: {0}")]
    ConnectionError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("query error: {0}")]
    QueryError(String),

    #[error("stats error: {0}")]
    StatsError(String),

    #[error("invalid index response: {0}")]
    InvalidResponse(String),

    #[error("vector index client error: {0}")]
    ClientError(String),
}

impl Retryable for VectorStoreError {
    fn is_retryable(&self) -> bool {
        match self {
            VectorStoreError::ConnectionError(_) => true,
            VectorStoreError::InvalidResponse(_) => false,
            VectorStoreError::UpsertError(msg)
            | VectorStoreError::QueryError(msg)
            | VectorStoreError::StatsError(msg)
            | VectorStoreError::ClientError(msg) => is_transient_message(msg),
        }
    }
}

/// HTTP status carried as the leading `status NNN` token of an error message.
fn leading_status(msg: &str) -> Option<u16> {
    let rest = msg.strip_prefix("status ")?;
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..end].parse().ok()
}

fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Messages with an HTTP status are classified on that status alone, since
/// the response body that follows it is arbitrary text.
fn is_transient_message(msg: &str) -> bool {
    if let Some(status) = leading_status(msg) {
        return is_transient_status(status);
    }
    let msg_lower = msg.to_lowercase();
    msg_lower.contains("unavailable")
        || msg_lower.contains("too many requests")
        || msg_lower.contains("timeout")
        || msg_lower.contains("timed out")
        || msg_lower.contains("connection")
}

/// Errors raised while embedding and storing a corpus.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error(
        "embedding provider returned {actual} vectors for {expected} texts in batch starting at {start}"
    )]
    ContractViolation {
        start: usize,
        expected: usize,
        actual: usize,
    },

    #[error("embedding failed for batch {start}..{end} (resume from offset {next_offset}): {source}")]
    Embedding {
        start: usize,
        end: usize,
        next_offset: usize,
        #[source]
        source: EmbeddingError,
    },

    #[error("upsert failed for batch {start}..{end} (resume from offset {next_offset}): {source}")]
    Upsert {
        start: usize,
        end: usize,
        next_offset: usize,
        #[source]
        source: VectorStoreError,
    },
}

impl IndexError {
    /// Offset one past the last entry that was stored before the failure.
    pub fn next_offset(&self) -> Option<usize> {
        match self {
            IndexError::ContractViolation { start, .. } => Some(*start),
            IndexError::Embedding { next_offset, .. } | IndexError::Upsert { next_offset, .. } => {
                Some(*next_offset)
            }
            IndexError::InvalidBatchSize => None,
        }
    }
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors related to query operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("embedding provider returned {0} vectors for a single query")]
    ContractViolation(usize),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
