//! Qdrant vector index backend implementation.

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value};
use std::collections::HashMap;
use tracing::debug;

use super::VectorIndex;
use crate::error::VectorStoreError;
use crate::models::{EntryMetadata, IndexEntry, IndexStats, QueryMatch, VectorStoreConfig};

const TEXT_FIELD: &str = "text";

/// Qdrant vector index backend.
pub struct QdrantBackend {
    client: Qdrant,
    collection: String,
    url: String,
}

impl QdrantBackend {
    pub fn new(
        config: &VectorStoreConfig,
        api_key: Option<&str>,
    ) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.qdrant_url);

        if let Some(api_key) = api_key {
            builder = builder.api_key(api_key.to_string());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            collection: config.index.clone(),
            url: config.qdrant_url.clone(),
        })
    }
}

/// Qdrant only accepts unsigned integers or UUIDs as point ids.
fn to_point_id(id: &str) -> Result<PointId, VectorStoreError> {
    id.parse::<u64>().map(PointId::from).map_err(|_| {
        VectorStoreError::ClientError(format!("point id must be a non-negative integer: {id}"))
    })
}

fn from_point_id(id: Option<&PointId>) -> String {
    match id.and_then(|id| id.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(num)) => num.to_string(),
        Some(PointIdOptions::Uuid(uuid)) => uuid.clone(),
        None => String::new(),
    }
}

fn payload_text(payload: &HashMap<String, Value>) -> Option<String> {
    payload.get(TEXT_FIELD).and_then(|v| match &v.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    })
}

#[async_trait]
impl VectorIndex for QdrantBackend {
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<(), VectorStoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        let count = entries.len();
        let points = entries
            .into_iter()
            .map(|entry| {
                let mut payload: HashMap<String, Value> = HashMap::new();
                payload.insert(TEXT_FIELD.to_string(), entry.metadata.text.into());
                Ok(PointStruct::new(to_point_id(&entry.id)?, entry.values, payload))
            })
            .collect::<Result<Vec<_>, VectorStoreError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        debug!(count, collection = %self.collection, "upserted points");
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>, VectorStoreError> {
        let search = SearchPointsBuilder::new(&self.collection, vector, top_k)
            .with_payload(include_metadata);

        let results = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::QueryError(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .map(|point| QueryMatch {
                id: from_point_id(point.id.as_ref()),
                score: f64::from(point.score),
                metadata: payload_text(&point.payload).map(EntryMetadata::new),
            })
            .collect())
    }

    async fn stats(&self) -> Result<IndexStats, VectorStoreError> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| VectorStoreError::StatsError(e.to_string()))?;

        Ok(IndexStats {
            total_vectors: info.result.map_or(0, |r| r.points_count.unwrap_or(0)),
            dimension: None,
        })
    }

    fn index_name(&self) -> &str {
        &self.collection
    }

    fn location(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_round_trip() {
        let id = to_point_id("42").unwrap();
        assert_eq!(from_point_id(Some(&id)), "42");
        assert_eq!(from_point_id(None), "");
    }

    #[test]
    fn test_non_numeric_point_id_rejected() {
        assert!(matches!(
            to_point_id("doc-1"),
            Err(VectorStoreError::ClientError(_))
        ));
    }

    #[test]
    fn test_payload_text() {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(TEXT_FIELD.to_string(), "Cats and dogs".to_string().into());
        assert_eq!(payload_text(&payload).as_deref(), Some("Cats and dogs"));

        payload.insert(TEXT_FIELD.to_string(), 3_i64.into());
        assert_eq!(payload_text(&payload), None);
    }

    #[tokio::test]
    async fn test_backend_binds_collection() {
        let config = VectorStoreConfig {
            index: "demo".to_string(),
            ..Default::default()
        };
        let backend = QdrantBackend::new(&config, None).unwrap();
        assert_eq!(backend.index_name(), "demo");
        assert_eq!(backend.location(), config.qdrant_url);
    }
}
