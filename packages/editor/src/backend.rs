//! # Collaborators
//!
//! Persistence and media upload live outside the editor. Both are reached
//! through async traits so the session never depends on a transport; the
//! HTTP adapter (or [`crate::InMemoryBackend`]) implements them.
//!
//! Failures come back as [`UpstreamFailure`] and are never retried here.

use crate::article::{Article, SavePayload};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status reported when a request never produced a response in time
pub const TIMEOUT_STATUS: u16 = 504;

/// Non-2xx response, or no response at all, from a collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Upstream request failed ({status}): {message}")]
pub struct UpstreamFailure {
    pub status: u16,
    pub message: String,
}

/// `{ success, data, error, message }` envelope used by the articles API
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
    message: Option<String>,
}

impl UpstreamFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::new(TIMEOUT_STATUS, "Request timed out")
    }

    /// Failure for a response, preferring the envelope's `message` over
    /// its `error` and over the raw body
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message.or(envelope.error))
            .unwrap_or_else(|| match body.trim() {
                "" => format!("HTTP {}", status),
                text => text.to_string(),
            });

        Self::new(status, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Unwrap an API response into its `data`, or the failure it describes
pub fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, UpstreamFailure> {
    if !(200..300).contains(&status) {
        return Err(UpstreamFailure::from_response(status, body));
    }

    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| UpstreamFailure::new(status, format!("Malformed response: {}", e)))?;

    match envelope {
        Envelope {
            success: true,
            data: Some(data),
            ..
        } => Ok(data),
        Envelope { message, error, .. } => Err(UpstreamFailure::new(
            status,
            message
                .or(error)
                .unwrap_or_else(|| "Response carried no data".to_string()),
        )),
    }
}

/// Article persistence
#[async_trait]
pub trait ArticleBackend: Send + Sync {
    async fn create(&self, payload: &SavePayload) -> Result<Article, UpstreamFailure>;

    async fn update(&self, id: i64, payload: &SavePayload) -> Result<Article, UpstreamFailure>;

    async fn fetch(&self, id: i64) -> Result<Article, UpstreamFailure>;
}

/// Result of an image upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Image storage
#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn upload_image(
        &self,
        article_id: i64,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<MediaUpload, UpstreamFailure>;
}
