//! Types for download lifecycle tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::magnet::extract_info_hash;
use crate::provider::ProviderError;

use super::store::StoreError;

/// Canonical lifecycle status of a tracked download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Created locally; the provider has not listed the job yet.
    Initializing,
    /// The provider reports an active, non-terminal job.
    Downloading,
    /// The provider reports the job finished.
    Completed,
    /// The provider reports an error.
    Error,
}

impl DownloadStatus {
    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Initializing => "initializing",
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Error => "error",
        }
    }

    /// Terminal statuses never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Error)
    }
}

/// A download tracked by this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Locally generated identifier, never reused.
    pub local_id: String,
    /// Magnet (or other descriptor) the job was created from.
    pub magnet_uri: String,
    /// Lowercase info hash, when the descriptor is a magnet with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    /// Display name supplied when the download was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Provider job id. Once set it never changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,
    pub status: DownloadStatus,
    /// Raw provider entry from the last successful match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DownloadRecord {
    /// Create a record in the `initializing` state.
    pub fn new(
        local_id: impl Into<String>,
        magnet_uri: impl Into<String>,
        name: Option<String>,
        upstream_id: Option<String>,
    ) -> Self {
        let magnet_uri = magnet_uri.into();
        let now = Utc::now();
        Self {
            local_id: local_id.into(),
            info_hash: extract_info_hash(&magnet_uri),
            magnet_uri,
            name,
            upstream_id,
            status: DownloadStatus::Initializing,
            last_snapshot: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Reconcile with a matched provider entry.
    ///
    /// Terminal records are left untouched. The upstream id is only
    /// backfilled, never replaced.
    pub fn apply_snapshot(&mut self, snapshot: JobSnapshot) {
        if self.is_terminal() {
            return;
        }
        self.status = snapshot.status;
        if self.upstream_id.is_none() {
            self.upstream_id = snapshot.upstream_id;
        }
        self.last_snapshot = Some(snapshot.raw);
        self.updated_at = Utc::now();
    }
}

/// A provider job entry classified into local terms.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub status: DownloadStatus,
    pub upstream_id: Option<String>,
    pub raw: Value,
}

/// Request to start tracking a new download.
///
/// A missing `magnet` deserializes as blank so it fails validation like an
/// empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddDownloadRequest {
    #[serde(default)]
    pub magnet: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Ask the provider to create the job only if it is already cached.
    #[serde(default)]
    pub only_cached: bool,
}

/// Result of a successful add.
#[derive(Debug, Clone, Serialize)]
pub struct AddDownloadOutcome {
    pub local_id: String,
    /// Raw single-hash cache check, if one was made and succeeded.
    pub cached: Option<Value>,
    /// Raw job creation response.
    #[serde(rename = "provider")]
    pub provider_response: Value,
}

/// Event pushed to a stream subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "record", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// Latest state of the record, sent once per poll.
    Update(DownloadRecord),
    /// The record reached a terminal status; nothing follows.
    Done,
}

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("download not found: {0}")]
    NotFound(String),

    #[error("provider error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
