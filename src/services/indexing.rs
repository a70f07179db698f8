//! Orchestration of the embedding provider and the vector index.

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::batch::store_batch;
use crate::error::{AppError, IndexError, SearchError};
use crate::models::{
    BatchWindow, Config, Credentials, QueryMatch, StoreReport, batch_windows, sort_by_score,
};
use crate::services::{EmbeddingProvider, OpenAiEmbeddingClient, VectorIndex, create_backend};
use crate::utils::retry::RetryConfig;

/// Embeds corpora into a vector index and answers nearest-neighbor queries.
///
/// Holds the two provider handles for its lifetime; keeps no other state.
#[derive(Clone)]
pub struct IndexingClient {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    retry: RetryConfig,
}

impl IndexingClient {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Build the OpenAI client and the configured index backend.
    pub async fn from_config(config: &Config, credentials: &Credentials) -> Result<Self, AppError> {
        let embedder = OpenAiEmbeddingClient::new(&config.embedding, &credentials.openai_api_key)?;
        let index = create_backend(&config.vector_store, credentials).await?;

        Ok(Self::new(Arc::new(embedder), Arc::from(index))
            .with_retry(RetryConfig::from_indexing(&config.indexing)))
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Embed `texts` in windows of `batch_size` and upsert each window.
    ///
    /// The record at position `i` is stored under id `i`, so re-running over the
    /// same texts overwrites rather than duplicates.
    pub async fn embed_and_store(
        &self,
        batch_size: usize,
        texts: &[String],
    ) -> Result<StoreReport, IndexError> {
        self.embed_and_store_from(0, batch_size, texts, |_| {}).await
    }

    /// Like [`embed_and_store`](Self::embed_and_store), skipping the first
    /// `start_offset` texts. `on_batch` is called after each stored window.
    pub async fn embed_and_store_from<F>(
        &self,
        start_offset: usize,
        batch_size: usize,
        texts: &[String],
        mut on_batch: F,
    ) -> Result<StoreReport, IndexError>
    where
        F: FnMut(BatchWindow),
    {
        if batch_size == 0 {
            return Err(IndexError::InvalidBatchSize);
        }

        let start_time = Instant::now();
        let windows = batch_windows(texts.len(), start_offset, batch_size);
        let mut report = StoreReport {
            next_offset: start_offset.min(texts.len()),
            ..Default::default()
        };

        info!(
            index = self.index.index_name(),
            model = self.embedder.model(),
            texts = texts.len(),
            start_offset,
            batch_size,
            batches = windows.len(),
            "embedding and storing corpus"
        );

        for window in windows {
            store_batch(
                self.embedder.as_ref(),
                self.index.as_ref(),
                &self.retry,
                texts,
                window,
            )
            .await?;

            report.batches += 1;
            report.entries += window.len();
            report.next_offset = window.end;
            on_batch(window);
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            batches = report.batches,
            entries = report.entries,
            duration_ms = report.duration_ms,
            "corpus stored"
        );

        Ok(report)
    }

    /// Embed `query_text` and return up to `top_k` matches, best first.
    pub async fn query(
        &self,
        query_text: &str,
        top_k: u32,
    ) -> Result<Vec<QueryMatch>, SearchError> {
        if top_k == 0 {
            return Err(SearchError::InvalidTopK);
        }

        let input = [query_text.to_string()];
        let mut vectors = self.embedder.embed(&input).await?;
        if vectors.len() != 1 {
            return Err(SearchError::ContractViolation(vectors.len()));
        }
        let vector = vectors.swap_remove(0);

        let mut matches = self.index.query(vector, u64::from(top_k), true).await?;

        // The backend is expected to rank already; enforce it.
        sort_by_score(&mut matches);
        matches.truncate(top_k as usize);

        info!(top_k, matches = matches.len(), "query complete");
        Ok(matches)
    }
}
