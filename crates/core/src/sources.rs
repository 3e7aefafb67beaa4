//! Source discovery: search, rank, and annotate with cache status.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::magnet::extract_info_hash;
use crate::metrics::{CANDIDATES_RETURNED, SOURCE_SEARCHES};
use crate::provider::CacheStatusResolver;
use crate::searcher::{
    human_size, rank_candidates, AnnotatedCandidate, SearchError, SearchQuery, Searcher,
};

/// Default number of ranked candidates kept per search.
pub const DEFAULT_MAX_CANDIDATES: usize = 60;

/// Errors from a source search.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("search failed: {0}")]
    Upstream(#[from] SearchError),
}

/// Ranked, annotated results of one search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSearchResult {
    /// The query sent to the aggregator.
    pub query: String,
    pub count: usize,
    pub results: Vec<AnnotatedCandidate>,
}

/// Finds and ranks download sources for a title.
pub struct SourceFinder {
    searcher: Arc<dyn Searcher>,
    resolver: CacheStatusResolver,
    max_candidates: usize,
}

impl SourceFinder {
    pub fn new(searcher: Arc<dyn Searcher>, resolver: CacheStatusResolver) -> Self {
        Self {
            searcher,
            resolver,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    /// Limit how many ranked candidates are annotated and returned.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Search for a title, rank the results and annotate the top candidates
    /// with their info hash and cache status.
    ///
    /// A failed cache lookup leaves every candidate uncached; only a search
    /// failure is an error.
    pub async fn find(&self, title: &str, year: Option<u32>) -> Result<SourceSearchResult, SourceError> {
        if title.trim().is_empty() {
            SOURCE_SEARCHES.with_label_values(&["invalid"]).inc();
            return Err(SourceError::Validation("title is required".to_string()));
        }

        let query = SearchQuery::from_title(title, year);
        debug!(searcher = self.searcher.name(), query = %query.query, "Searching sources");

        let raw = match self.searcher.search(&query).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(query = %query.query, error = %e, "Source search failed");
                SOURCE_SEARCHES.with_label_values(&["upstream_error"]).inc();
                return Err(e.into());
            }
        };
        let found = raw.len();

        let mut ranked = rank_candidates(raw);
        ranked.truncate(self.max_candidates);

        let hashes: Vec<Option<String>> = ranked
            .iter()
            .map(|r| r.candidate.descriptor().and_then(extract_info_hash))
            .collect();
        let statuses = self.resolver.resolve(hashes.iter().flatten()).await;

        let results: Vec<AnnotatedCandidate> = ranked
            .into_iter()
            .zip(hashes)
            .map(|(ranked, info_hash)| {
                let cached = info_hash
                    .as_ref()
                    .and_then(|h| statuses.get(h))
                    .copied()
                    .unwrap_or(false);
                AnnotatedCandidate {
                    size_human: human_size(ranked.candidate.size_bytes),
                    candidate: ranked.candidate,
                    score: ranked.score,
                    info_hash,
                    cached,
                }
            })
            .collect();

        info!(
            query = %query.query,
            found,
            returned = results.len(),
            cached = results.iter().filter(|r| r.cached).count(),
            "Source search complete"
        );
        SOURCE_SEARCHES.with_label_values(&["success"]).inc();
        CANDIDATES_RETURNED
            .with_label_values(&[])
            .observe(results.len() as f64);

        Ok(SourceSearchResult {
            query: query.query,
            count: results.len(),
            results,
        })
    }
}
