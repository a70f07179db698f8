//! Embedding provider for generating text embeddings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;

/// Turns texts into vectors, one per input and in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;
}

/// Request body for the /embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response from the /embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embeddings API.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(
        config: &EmbeddingConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else if e.is_connect() {
                    EmbeddingError::ConnectionError(e.to_string())
                } else {
                    EmbeddingError::RequestError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ServerError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        into_ordered_vectors(embed_response.data)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Restore input order from the provider-reported `index` of each item.
///
/// Indices must be exactly `0..n`; the caller compares `n` against the number
/// of texts it submitted.
fn into_ordered_vectors(mut items: Vec<EmbeddingItem>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    items.sort_by_key(|item| item.index);

    if let Some((position, item)) = items
        .iter()
        .enumerate()
        .find(|(position, item)| item.index != *position)
    {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected embedding index {position}, got {}",
            item.index
        )));
    }

    Ok(items.into_iter().map(|item| item.embedding).collect())
}
