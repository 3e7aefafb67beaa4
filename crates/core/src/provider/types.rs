//! Types for download provider operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the download provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No provider API token configured")]
    MissingCredential,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Request to create a download job upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    /// Magnet URI (or any descriptor the provider accepts).
    pub magnet: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ask the provider to refuse the job unless it is already cached.
    #[serde(default)]
    pub add_only_if_cached: bool,
}

impl CreateJobRequest {
    pub fn new(magnet: impl Into<String>) -> Self {
        Self {
            magnet: magnet.into(),
            name: None,
            add_only_if_cached: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_add_only_if_cached(mut self, only_cached: bool) -> Self {
        self.add_only_if_cached = only_cached;
        self
    }
}

/// Trait for remote download (debrid) providers.
///
/// Response bodies are returned as raw JSON: their schema belongs to the
/// provider and is interpreted by the cache resolver and the lifecycle
/// tracker.
#[async_trait]
pub trait DownloadProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Whether a bearer credential is configured.
    fn has_credential(&self) -> bool;

    /// Check whether a single info hash is cached.
    async fn check_cached(&self, info_hash: &str) -> Result<Value, ProviderError>;

    /// Check a batch of info hashes in one request.
    async fn check_cached_batch(&self, info_hashes: &[String]) -> Result<Value, ProviderError>;

    /// Create a download job.
    async fn create_job(&self, request: &CreateJobRequest) -> Result<Value, ProviderError>;

    /// List the account's jobs.
    async fn list_jobs(&self, offset: u32, limit: u32) -> Result<Value, ProviderError>;
}
