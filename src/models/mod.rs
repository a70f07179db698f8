mod config;
mod entry;
mod search;

pub use config::{
    Config, Credentials, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL, DEFAULT_INDEX_NAME,
    DEFAULT_PINECONE_ENVIRONMENT, DEFAULT_QDRANT_URL, EmbeddingConfig, IndexingConfig,
    OPENAI_API_KEY_VAR, PINECONE_API_KEY_VAR, PINECONE_ENVIRONMENT_VAR, QDRANT_API_KEY_VAR,
    SearchConfig, VectorDriver, VectorStoreConfig,
};
pub use entry::{
    BatchWindow, EntryMetadata, IndexEntry, IndexStats, StoreReport, batch_windows, record_id,
};
pub use search::{OutputFormat, QueryMatch, QueryResults, render_matches, sort_by_score};
