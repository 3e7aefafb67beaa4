//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external service traits,
//! allowing source search and download tracking to be tested without a
//! running Jackett or a TorBox account.
//!
//! # Example
//!
//! ```rust,ignore
//! use streamhub_core::testing::{fixtures, MockDownloadProvider, MockSearcher};
//!
//! let searcher = MockSearcher::new();
//! let provider = MockDownloadProvider::new();
//!
//! // Configure mock responses
//! searcher.set_results(vec![fixtures::candidate("Heat 1995 1080p", "abc123")]).await;
//! provider.set_list_response(fixtures::job_listing(&[fixtures::job_entry(1001, "abc123", 50.0)])).await;
//!
//! // Use in AppState...
//! ```

mod mock_download_provider;
mod mock_searcher;

pub use mock_download_provider::MockDownloadProvider;
pub use mock_searcher::{MockSearcher, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::searcher::Candidate;

    /// Magnet link for an info hash.
    pub fn magnet(info_hash: &str) -> String {
        format!("magnet:?xt=urn:btih:{}&dn=fixture", info_hash)
    }

    /// Create a test candidate with reasonable defaults.
    pub fn candidate(title: &str, info_hash: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            magnet_uri: Some(magnet(info_hash)),
            link: None,
            seeders: 50,
            peers: 60,
            size_bytes: Some(2 * 1024 * 1024 * 1024), // 2 GB
            tracker: Some("mock-indexer".to_string()),
            categories: vec!["Movies".to_string()],
            details_url: None,
            publish_date: None,
        }
    }

    /// Create a movie candidate named like a typical release.
    pub fn movie_candidate(title: &str, year: u32, quality: &str, info_hash: &str) -> Candidate {
        candidate(&format!("{} {} {}", title, year, quality), info_hash)
    }

    /// One entry of the provider's job listing.
    pub fn job_entry(id: u64, info_hash: &str, progress: f64) -> Value {
        json!({
            "id": id,
            "hash": info_hash,
            "name": "fixture",
            "progress": progress,
            "download_state": if progress >= 100.0 { "completed" } else { "downloading" },
        })
    }

    /// A job listing wrapped in TorBox's `data` envelope.
    pub fn job_listing(entries: &[Value]) -> Value {
        json!({ "success": true, "detail": "Torrents list retrieved successfully.", "data": entries })
    }
}
