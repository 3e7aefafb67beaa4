//! Types for the torrent search system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query parameters for a source search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text search query.
    pub query: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Build a query from a title and optional release year, space-joined.
    pub fn from_title(title: &str, year: Option<u32>) -> Self {
        let title = title.trim();
        let query = match year {
            Some(year) => format!("{} {}", title, year),
            None => title.to_string(),
        };
        Self { query }
    }
}

/// One discovered source, as reported by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Release title.
    pub title: String,
    /// Magnet URI; candidates without one are never eligible for download.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// .torrent download URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Seeders reported by the tracker.
    #[serde(default)]
    pub seeders: u32,
    /// Total peers reported by the tracker.
    #[serde(default)]
    pub peers: u32,
    /// Size in bytes, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Origin tracker name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// Category tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Link to the tracker's details page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
    /// When the release was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
}

impl Candidate {
    /// The magnet URI, if present and non-blank.
    pub fn descriptor(&self) -> Option<&str> {
        self.magnet_uri
            .as_deref()
            .filter(|m| !m.trim().is_empty())
    }
}

/// A candidate with its ranking score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f64,
}

/// A ranked candidate annotated with its info hash and cache status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f64,
    /// Lowercase info hash derived from the magnet, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    /// Whether the download provider can serve this instantly.
    pub cached: bool,
    /// Human readable size ("1.50 GB", "-" if unknown).
    pub size_human: String,
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for torrent search backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Run one query against the aggregator and return the raw candidates.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SearchError>;
}
