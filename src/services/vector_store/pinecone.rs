//! Pinecone vector index backend over the REST data plane.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::VectorIndex;
use crate::error::VectorStoreError;
use crate::models::{EntryMetadata, IndexEntry, IndexStats, QueryMatch, VectorStoreConfig};

const API_KEY_HEADER: &str = "Api-Key";

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexEntry],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: u64,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    score: f64,
    #[serde(default)]
    metadata: Option<PineconeMetadata>,
}

#[derive(Debug, Deserialize)]
struct PineconeMetadata {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    dimension: Option<u32>,
    #[serde(default)]
    total_vector_count: u64,
}

#[derive(Debug, Deserialize)]
struct WhoAmIResponse {
    project_name: String,
}

/// Controller endpoint for a legacy Pinecone environment.
pub fn controller_url(environment: &str) -> String {
    format!("https://controller.{environment}.pinecone.io")
}

/// Data-plane host of `index` inside `project` and `environment`.
pub fn data_plane_host(index: &str, project: &str, environment: &str) -> String {
    format!("https://{index}-{project}.svc.{environment}.pinecone.io")
}

/// Pinecone vector index backend.
pub struct PineconeBackend {
    client: Client,
    host: String,
    index: String,
    api_key: String,
}

impl PineconeBackend {
    /// Bind to the configured index, resolving its host through the controller
    /// unless one is configured explicitly.
    pub async fn connect(
        config: &VectorStoreConfig,
        api_key: &str,
        environment: &str,
    ) -> Result<Self, VectorStoreError> {
        let client = build_client(config.timeout_secs)?;

        let host = match config.host {
            Some(ref host) => host.clone(),
            None => {
                let project =
                    resolve_project(&client, &controller_url(environment), api_key).await?;
                data_plane_host(&config.index, &project, environment)
            }
        };

        info!(index = %config.index, host = %host, "bound to Pinecone index");
        Self::with_host(config, host, api_key)
    }

    /// Bind to an index served at a known host.
    pub fn with_host(
        config: &VectorStoreConfig,
        host: impl Into<String>,
        api_key: &str,
    ) -> Result<Self, VectorStoreError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            host: host.into().trim_end_matches('/').to_string(),
            index: config.index.clone(),
            api_key: api_key.to_string(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.host, path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
    }
}

fn build_client(timeout_secs: u64) -> Result<Client, VectorStoreError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| VectorStoreError::ClientError(e.to_string()))
}

/// Look up the project name that owns `api_key`.
pub(crate) async fn resolve_project(
    client: &Client,
    controller: &str,
    api_key: &str,
) -> Result<String, VectorStoreError> {
    let url = format!("{}/actions/whoami", controller.trim_end_matches('/'));
    let response = client
        .get(&url)
        .header(API_KEY_HEADER, api_key)
        .send()
        .await
        .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

    let response = check_status(response, VectorStoreError::ClientError).await?;
    let whoami: WhoAmIResponse = response
        .json()
        .await
        .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

    Ok(whoami.project_name)
}

/// Map a transport failure, keeping connect and timeout failures retryable.
fn send_error(e: reqwest::Error, wrap: fn(String) -> VectorStoreError) -> VectorStoreError {
    if e.is_connect() || e.is_timeout() {
        VectorStoreError::ConnectionError(e.to_string())
    } else {
        wrap(e.to_string())
    }
}

async fn check_status(
    response: Response,
    wrap: fn(String) -> VectorStoreError,
) -> Result<Response, VectorStoreError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(wrap(format!("status {}: {}", status, body)))
}

#[async_trait]
impl VectorIndex for PineconeBackend {
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<(), VectorStoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        let response = self
            .post("/vectors/upsert", &UpsertRequest { vectors: &entries })
            .await
            .map_err(|e| send_error(e, VectorStoreError::UpsertError))?;
        let response = check_status(response, VectorStoreError::UpsertError).await?;

        let upserted: UpsertResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        if let Some(count) = upserted.upserted_count
            && count != entries.len() as u64
        {
            return Err(VectorStoreError::InvalidResponse(format!(
                "upserted {count} of {} vectors",
                entries.len()
            )));
        }

        debug!(count = entries.len(), "upserted vectors");
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>, VectorStoreError> {
        let request = QueryRequest {
            vector: &vector,
            top_k,
            include_metadata,
            include_values: false,
        };

        let response = self
            .post("/query", &request)
            .await
            .map_err(|e| send_error(e, VectorStoreError::QueryError))?;
        let response = check_status(response, VectorStoreError::QueryError).await?;

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m
                    .metadata
                    .and_then(|meta| meta.text)
                    .map(EntryMetadata::new),
            })
            .collect())
    }

    async fn stats(&self) -> Result<IndexStats, VectorStoreError> {
        let response = self
            .post("/describe_index_stats", &serde_json::json!({}))
            .await
            .map_err(|e| send_error(e, VectorStoreError::StatsError))?;
        let response = check_status(response, VectorStoreError::StatsError).await?;

        let stats: StatsResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        Ok(IndexStats {
            total_vectors: stats.total_vector_count,
            dimension: stats.dimension,
        })
    }

    fn index_name(&self) -> &str {
        &self.index
    }

    fn location(&self) -> &str {
        &self.host
    }
}
