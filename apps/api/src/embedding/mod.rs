//! Embedding provider adapter.
//!
//! `GeminiEmbedder` wraps Google's `text-embedding-004` model (768 dimensions).
//! The engine only sees the `EmbeddingProvider` trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, UpstreamError};
use crate::models::component::EMBEDDING_DIMENSIONS;

pub mod backfill;
pub mod handlers;
pub mod text;

const GEMINI_EMBED_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent";
const EMBEDDING_MODEL: &str = "models/text-embedding-004";
const SERVICE: &str = "gemini";
/// Longer input is cut before sending; the model ignores tokens past its window anyway.
const MAX_EMBED_CHARS: usize = 8_000;

/// Text → fixed-length vector. No retries inside implementations.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: EmbedContent<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
}

impl GeminiEmbedder {
    /// Fails fast when the API key is missing, before any request is made.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            AppError::Config(
                "GEMINI_API_KEY is not set; the embedding provider cannot be created".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let text = truncate_chars(text, MAX_EMBED_CHARS);
        let request = EmbedRequest {
            model: EMBEDDING_MODEL,
            content: EmbedContent {
                parts: vec![EmbedPart { text }],
            },
        };

        let response = self
            .client
            .post(GEMINI_EMBED_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(UpstreamError::from_status(SERVICE, status.as_u16(), message));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_transport(SERVICE, e))?;

        let values = check_dimensions(parsed.embedding.values)?;
        debug!("Embedded {} chars into {} dimensions", text.len(), values.len());
        Ok(values)
    }
}

fn check_dimensions(values: Vec<f32>) -> Result<Vec<f32>, UpstreamError> {
    if values.len() != EMBEDDING_DIMENSIONS {
        return Err(UpstreamError::InvalidResponse {
            service: SERVICE,
            message: format!(
                "expected {EMBEDDING_DIMENSIONS} dimensions, got {}",
                values.len()
            ),
        });
    }
    Ok(values)
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
