mod batch;
mod embedding;
mod indexing;
#[cfg(test)]
pub(crate) mod testing;
mod vector_store;

pub use embedding::{EmbeddingProvider, OpenAiEmbeddingClient};
pub use indexing::IndexingClient;
pub use vector_store::{
    PineconeBackend, QdrantBackend, VectorIndex, controller_url, create_backend, data_plane_host,
};
