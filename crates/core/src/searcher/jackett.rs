//! Jackett search backend implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::JackettConfig;

use super::{Candidate, SearchError, SearchQuery, Searcher};

/// Jackett search backend.
///
/// Every query goes to the aggregated `all` indexer in a single request.
pub struct JackettSearcher {
    client: Client,
    config: JackettConfig,
}

impl JackettSearcher {
    /// Create a new JackettSearcher with the given configuration.
    pub fn new(config: JackettConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/api/v2.0/indexers/all/results?apikey={}&Query={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&query.query)
        )
    }
}

#[async_trait]
impl Searcher for JackettSearcher {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SearchError> {
        let url = self.build_search_url(query);
        debug!(query = %query.query, "Searching Jackett");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else if e.is_connect() {
                SearchError::ConnectionFailed(e.to_string())
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("Failed to parse response: {}", e)))?;

        let results = jackett_response.Results.unwrap_or_default();
        debug!(results = results.len(), "Jackett search complete");

        Ok(results.into_iter().map(JackettResult::into_candidate).collect())
    }
}

/// Parse Jackett's date format.
fn parse_jackett_date(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    #[serde(default)]
    Results: Option<Vec<JackettResult>>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    #[serde(default)]
    Title: Option<String>,
    MagnetUri: Option<String>,
    Link: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i64>,
    Peers: Option<i64>,
    Tracker: Option<String>,
    #[serde(default)]
    CategoryDesc: Option<CategoryDesc>,
    PublishDate: Option<String>,
    Details: Option<String>,
}

/// Jackett sends `CategoryDesc` as a single string; some indexers send a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryDesc {
    One(String),
    Many(Vec<String>),
}

impl JackettResult {
    fn into_candidate(self) -> Candidate {
        let categories = match self.CategoryDesc {
            Some(CategoryDesc::One(c)) => vec![c],
            Some(CategoryDesc::Many(cs)) => cs,
            None => Vec::new(),
        };

        Candidate {
            title: self.Title.unwrap_or_default(),
            magnet_uri: self.MagnetUri,
            link: self.Link,
            seeders: self.Seeders.unwrap_or(0).max(0) as u32,
            peers: self.Peers.unwrap_or(0).max(0) as u32,
            size_bytes: self.Size.filter(|s| *s >= 0).map(|s| s as u64),
            tracker: self.Tracker,
            categories,
            details_url: self.Details,
            publish_date: self.PublishDate.and_then(|d| parse_jackett_date(&d)),
        }
    }
}
