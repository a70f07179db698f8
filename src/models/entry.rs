//! Records and index entries flowing from the corpus into the vector index.

use serde::{Deserialize, Serialize};

/// Metadata stored alongside every vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub text: String,
}

impl EntryMetadata {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A single `(id, vector, metadata)` triple upserted into the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Build the entry for the record at `position` in the corpus.
    pub fn new(position: usize, values: Vec<f32>, text: impl Into<String>) -> Self {
        Self {
            id: record_id(position),
            values,
            metadata: EntryMetadata::new(text),
        }
    }
}

/// Identifier of the record at `position`: its zero-based offset as a string.
pub fn record_id(position: usize) -> String {
    position.to_string()
}

/// Half-open `[start, end)` slice of the corpus handled by one embed and one upsert call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    pub start: usize,
    pub end: usize,
}

impl BatchWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn ids(&self) -> Vec<String> {
        (self.start..self.end).map(record_id).collect()
    }
}

/// Split `[start_offset, total)` into consecutive windows of `batch_size`.
///
/// The final window may be shorter. Returns nothing when `batch_size` is zero
/// or `start_offset >= total`.
pub fn batch_windows(total: usize, start_offset: usize, batch_size: usize) -> Vec<BatchWindow> {
    if batch_size == 0 {
        return Vec::new();
    }

    (start_offset..total)
        .step_by(batch_size)
        .map(|start| BatchWindow {
            start,
            end: (start + batch_size).min(total),
        })
        .collect()
}

/// Summary of a completed `embed_and_store` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReport {
    pub batches: usize,
    pub entries: usize,
    /// Offset one past the last stored record.
    pub next_offset: usize,
    pub duration_ms: u64,
}

/// Index statistics reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vectors: u64,
    pub dimension: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_position() {
        assert_eq!(record_id(0), "0");
        assert_eq!(record_id(41), "41");
    }

    #[test]
    fn test_single_window_when_batch_exceeds_corpus() {
        let windows = batch_windows(3, 0, 32);
        assert_eq!(windows, vec![BatchWindow { start: 0, end: 3 }]);
        assert_eq!(windows[0].ids(), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_short_final_window() {
        let windows = batch_windows(3, 0, 2);
        assert_eq!(
            windows,
            vec![BatchWindow { start: 0, end: 2 }, BatchWindow { start: 2, end: 3 }]
        );
    }

    #[test]
    fn test_windows_cover_corpus_exactly_once() {
        for total in 0..40 {
            for batch_size in 1..9 {
                let ids: Vec<String> = batch_windows(total, 0, batch_size)
                    .iter()
                    .flat_map(BatchWindow::ids)
                    .collect();
                let expected: Vec<String> = (0..total).map(record_id).collect();
                assert_eq!(ids, expected, "total={total} batch_size={batch_size}");
            }
        }
    }

    #[test]
    fn test_windows_from_offset() {
        let windows = batch_windows(5, 2, 2);
        assert_eq!(
            windows,
            vec![BatchWindow { start: 2, end: 4 }, BatchWindow { start: 4, end: 5 }]
        );
    }

    #[test]
    fn test_no_windows() {
        assert!(batch_windows(0, 0, 4).is_empty());
        assert!(batch_windows(3, 3, 4).is_empty());
        assert!(batch_windows(3, 10, 4).is_empty());
        assert!(batch_windows(3, 0, 0).is_empty());
    }

    #[test]
    fn test_entry_metadata_is_verbatim() {
        let text = "  Tea is one of the worlds oldest drinks\n";
        let entry = IndexEntry::new(7, vec![0.1, 0.2], text);
        assert_eq!(entry.id, "7");
        assert_eq!(entry.metadata.text, text);
    }
}
