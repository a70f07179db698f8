use tracing::debug;

use crate::error::IndexError;
use crate::models::{BatchWindow, IndexEntry};
use crate::services::{EmbeddingProvider, VectorIndex};
use crate::utils::retry::{RetryConfig, with_retry};

/// Embed one window of the corpus and upsert it as a single request.
///
/// `texts` is the whole corpus; ids come from absolute positions in it.
pub(crate) async fn store_batch(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    retry: &RetryConfig,
    texts: &[String],
    window: BatchWindow,
) -> Result<(), IndexError> {
    let BatchWindow { start, end } = window;
    let lines = &texts[start..end];

    let embeddings = with_retry(retry, "embed", || embedder.embed(lines))
        .await
        .map_err(|source| IndexError::Embedding {
            start,
            end,
            next_offset: start,
            source,
        })?;

    if embeddings.len() != lines.len() {
        return Err(IndexError::ContractViolation {
            start,
            expected: lines.len(),
            actual: embeddings.len(),
        });
    }

    let entries: Vec<IndexEntry> = lines
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(i, (line, values))| IndexEntry::new(start + i, values, line.as_str()))
        .collect();

    with_retry(retry, "upsert", || index.upsert(entries.clone()))
        .await
        .map_err(|source| IndexError::Upsert {
            start,
            end,
            next_offset: start,
            source,
        })?;

    debug!(start, end, "stored batch");
    Ok(())
}
