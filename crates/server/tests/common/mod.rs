//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without a running
//! Jackett or a TorBox account.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use streamhub_core::{
    testing::{MockDownloadProvider, MockSearcher},
    CacheStatusResolver, Config, DownloadTracker, MemoryDownloadStore, SourceFinder,
};
use streamhub_server::state::AppState;

/// Re-export fixtures for test convenience
pub use streamhub_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Source search (MockSearcher)
/// - Cache checks and download jobs (MockDownloadProvider)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_add_download() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/downloads", json!({
///         "magnet": "magnet:?xt=urn:btih:abc123"
///     })).await;
///
///     assert_eq!(response.status, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock searcher - configure search results
    pub searcher: Arc<MockSearcher>,
    /// Mock provider - configure cache and job responses
    pub provider: Arc<MockDownloadProvider>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Wire up a searcher; without one source search answers 503
    pub enable_searcher: bool,
    /// Interval between stream polls
    pub poll_interval: Duration,
    /// Ranked candidates kept per search
    pub max_candidates: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enable_searcher: true,
            poll_interval: Duration::from_millis(20),
            max_candidates: 60,
        }
    }
}

impl TestConfig {
    /// Create config with no search backend.
    pub fn without_searcher() -> Self {
        Self {
            enable_searcher: false,
            ..Self::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let searcher = Arc::new(MockSearcher::new());
        let provider = Arc::new(MockDownloadProvider::new());

        let sources = test_config.enable_searcher.then(|| {
            SourceFinder::new(
                Arc::clone(&searcher) as Arc<dyn streamhub_core::Searcher>,
                CacheStatusResolver::new(Arc::clone(&provider) as Arc<dyn streamhub_core::DownloadProvider>),
            )
            .with_max_candidates(test_config.max_candidates)
        });

        let downloads = DownloadTracker::new(
            Arc::new(MemoryDownloadStore::new()),
            Arc::clone(&provider) as Arc<dyn streamhub_core::DownloadProvider>,
        )
        .with_poll_interval(test_config.poll_interval);

        let state = Arc::new(AppState::new(Config::default(), sources, downloads));
        let router = streamhub_server::api::create_router(state);

        Self {
            router,
            searcher,
            provider,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        TestResponse {
            status,
            body: parse_json(&bytes),
        }
    }

    /// Send a GET request and return the body as text (metrics, SSE).
    ///
    /// For streams this waits until the server closes the body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        let (status, bytes) = self.send(request).await;

        TestResponse {
            status,
            body: parse_json(&bytes),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, body_bytes.to_vec())
    }
}

fn parse_json(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    }
}
