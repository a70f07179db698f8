//! Vector index abstraction layer.
//!
//! This module provides a trait-based abstraction over the vector index backends
//! (Pinecone, Qdrant) so the indexing client can be driven by configuration or by
//! test doubles.

mod pinecone;
mod qdrant;

pub use pinecone::{PineconeBackend, controller_url, data_plane_host};
pub use qdrant::QdrantBackend;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{
    Credentials, IndexEntry, IndexStats, QueryMatch, VectorDriver, VectorStoreConfig,
};

/// Operations the indexing client needs from a vector index.
///
/// Upserts are keyed by entry id, so writing the same id twice overwrites.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or update entries in a single request.
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<(), VectorStoreError>;

    /// Nearest neighbors of `vector`, most similar first as reported by the backend.
    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>, VectorStoreError>;

    /// Vector count and dimension of the bound index.
    async fn stats(&self) -> Result<IndexStats, VectorStoreError>;

    /// Name of the bound index or collection.
    fn index_name(&self) -> &str;

    /// Host or URL the backend talks to.
    fn location(&self) -> &str;
}

/// Create a vector index backend based on configuration.
pub async fn create_backend(
    config: &VectorStoreConfig,
    credentials: &Credentials,
) -> Result<Box<dyn VectorIndex>, VectorStoreError> {
    match config.driver {
        VectorDriver::Pinecone => {
            let api_key = credentials.index_api_key.as_deref().ok_or_else(|| {
                VectorStoreError::ClientError("Pinecone API key is required".to_string())
            })?;
            let environment = credentials
                .environment
                .as_deref()
                .unwrap_or(&config.environment);
            let backend = PineconeBackend::connect(config, api_key, environment).await?;
            Ok(Box::new(backend))
        }
        VectorDriver::Qdrant => {
            let backend = QdrantBackend::new(config, credentials.index_api_key.as_deref())?;
            Ok(Box::new(backend))
        }
    }
}
