//! Mock searcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::searcher::{Candidate, SearchError, SearchQuery, Searcher};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The query that was searched.
    pub query: SearchQuery,
    /// When the search was made.
    pub timestamp: Instant,
}

/// Mock implementation of the Searcher trait.
///
/// Returns the configured candidates for every query, unranked, the way the
/// aggregator does. Queries are recorded and the next search can be made to
/// fail.
///
/// # Example
///
/// ```rust,ignore
/// use streamhub_core::testing::{fixtures, MockSearcher};
///
/// let searcher = MockSearcher::new();
/// searcher.set_results(vec![
///     fixtures::candidate("Heat 1995 1080p", "abc123"),
/// ]).await;
///
/// let found = searcher.search(&SearchQuery::new("Heat 1995")).await?;
/// assert_eq!(found.len(), 1);
/// assert_eq!(searcher.recorded_queries().await, vec!["Heat 1995"]);
/// ```
#[derive(Debug)]
pub struct MockSearcher {
    /// Configured results to return.
    results: Arc<RwLock<Vec<Candidate>>>,
    /// Recorded search queries.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a new mock searcher with empty results.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<Candidate>) {
        *self.results.write().await = results;
    }

    /// Add a single result.
    pub async fn add_result(&self, result: Candidate) {
        self.results.write().await.push(result);
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Query strings of recorded searches, in order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.searches
            .read()
            .await
            .iter()
            .map(|s| s.query.query.clone())
            .collect()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SearchError> {
        self.searches.write().await.push(RecordedSearch {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self.results.read().await.clone())
    }
}
