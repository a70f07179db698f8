//! Deterministic in-memory providers for tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{EmbeddingError, VectorStoreError};
use crate::models::{IndexEntry, IndexStats, QueryMatch};
use crate::services::{EmbeddingProvider, VectorIndex};

const DIMENSION: usize = 16;

/// Letter-frequency vector, normalized to unit length.
pub fn letter_vector(text: &str) -> Vec<f32> {
    let mut values = vec![0.0f32; DIMENSION];
    for b in text.bytes().filter(u8::is_ascii_alphabetic) {
        values[(b.to_ascii_lowercase() - b'a') as usize % DIMENSION] += 1.0;
    }
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        values.iter_mut().for_each(|v| *v /= norm);
    }
    values
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

type EmbedFailure = fn() -> EmbeddingError;
type StoreFailure = fn() -> VectorStoreError;

pub struct FakeEmbedder {
    calls: Mutex<Vec<Vec<String>>>,
    drop_last: bool,
    fail_after: Option<(usize, EmbedFailure)>,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            drop_last: false,
            fail_after: None,
        }
    }

    /// Return one vector fewer than requested.
    pub fn dropping_last_vector(mut self) -> Self {
        self.drop_last = true;
        self
    }

    /// Succeed `successes` times, then fail every call.
    pub fn failing_after(mut self, successes: usize, error: EmbedFailure) -> Self {
        self.fail_after = Some((successes, error));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let previous = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(texts.to_vec());
            calls.len() - 1
        };

        if let Some((successes, error)) = self.fail_after
            && previous >= successes
        {
            return Err(error());
        }

        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| letter_vector(t)).collect();
        if self.drop_last {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn model(&self) -> &str {
        "fake-letters"
    }
}

pub struct FakeIndex {
    entries: Mutex<BTreeMap<String, IndexEntry>>,
    upserts: Mutex<Vec<Vec<String>>>,
    upsert_attempts: AtomicUsize,
    upsert_failures: AtomicUsize,
    upsert_error: Option<StoreFailure>,
    reverse_results: bool,
    ignore_top_k: bool,
    fail_queries: bool,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            upserts: Mutex::new(Vec::new()),
            upsert_attempts: AtomicUsize::new(0),
            upsert_failures: AtomicUsize::new(0),
            upsert_error: None,
            reverse_results: false,
            ignore_top_k: false,
            fail_queries: false,
        }
    }

    /// Fail the first `count` upserts with `error`.
    pub fn failing_upserts(mut self, count: usize, error: StoreFailure) -> Self {
        self.upsert_failures = AtomicUsize::new(count);
        self.upsert_error = Some(error);
        self
    }

    /// Return query matches worst first.
    pub fn reversing_results(mut self) -> Self {
        self.reverse_results = true;
        self
    }

    /// Return every stored entry from queries.
    pub fn ignoring_top_k(mut self) -> Self {
        self.ignore_top_k = true;
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Ids of each successful upsert call, in call order.
    pub fn upsert_calls(&self) -> Vec<Vec<String>> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn upsert_attempts(&self) -> usize {
        self.upsert_attempts.load(Ordering::SeqCst)
    }

    pub fn stored_text(&self, id: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(id)
            .map(|e| e.metadata.text.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<(), VectorStoreError> {
        self.upsert_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.upsert_error
            && self
                .upsert_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(error());
        }

        self.upserts
            .lock()
            .unwrap()
            .push(entries.iter().map(|e| e.id.clone()).collect());

        let mut stored = self.entries.lock().unwrap();
        for entry in entries {
            stored.insert(entry.id.clone(), entry);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>, VectorStoreError> {
        if self.fail_queries {
            return Err(VectorStoreError::QueryError("status 400: bad vector".to_string()));
        }

        let stored = self.entries.lock().unwrap();
        let mut matches: Vec<QueryMatch> = stored
            .values()
            .map(|entry| QueryMatch {
                id: entry.id.clone(),
                score: f64::from(dot(&vector, &entry.values)),
                metadata: include_metadata.then(|| entry.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        if !self.ignore_top_k {
            matches.truncate(top_k as usize);
        }
        if self.reverse_results {
            matches.reverse();
        }
        Ok(matches)
    }

    async fn stats(&self) -> Result<IndexStats, VectorStoreError> {
        Ok(IndexStats {
            total_vectors: self.len() as u64,
            dimension: Some(DIMENSION as u32),
        })
    }

    fn index_name(&self) -> &str {
        "fake"
    }

    fn location(&self) -> &str {
        "memory"
    }
}
