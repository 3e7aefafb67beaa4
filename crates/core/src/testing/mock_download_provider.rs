//! Mock download provider for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::provider::{CreateJobRequest, DownloadProvider, ProviderError};

/// Configurable responses and recorded calls.
#[derive(Debug)]
struct MockProviderState {
    cached_response: Value,
    batch_response: Value,
    /// Overrides the generated creation response when set.
    create_response: Option<Value>,
    list_response: Value,

    cached_checks: Vec<String>,
    batch_checks: Vec<Vec<String>>,
    created: Vec<CreateJobRequest>,
    list_calls: usize,

    fail_cached: bool,
    fail_batch: bool,
    fail_create: bool,
    fail_list: bool,
}

impl Default for MockProviderState {
    fn default() -> Self {
        Self {
            cached_response: json!({}),
            batch_response: json!({}),
            create_response: None,
            list_response: json!([]),
            cached_checks: Vec::new(),
            batch_checks: Vec::new(),
            created: Vec::new(),
            list_calls: 0,
            fail_cached: false,
            fail_batch: false,
            fail_create: false,
            fail_list: false,
        }
    }
}

/// Mock implementation of the DownloadProvider trait.
///
/// Provides controllable behavior for testing:
/// - Canned bodies for cache checks, job creation and the job listing
/// - Recorded calls for assertions
/// - Per-operation failure toggles
///
/// Unless overridden, job creation answers like TorBox with an increasing
/// `torrent_id` under `data`.
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockDownloadProvider::new();
/// provider.set_list_response(json!({ "data": [ { "id": 1, "progress": 100 } ] })).await;
///
/// provider.create_job(&CreateJobRequest::new("magnet:?xt=urn:btih:abc")).await?;
/// assert_eq!(provider.created_jobs().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockDownloadProvider {
    state: Arc<RwLock<MockProviderState>>,
    has_credential: bool,
}

impl Default for MockDownloadProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloadProvider {
    /// Create a mock provider with a configured credential.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockProviderState::default())),
            has_credential: true,
        }
    }

    /// Create a mock provider that reports no credential.
    ///
    /// Every call still succeeds, so tests can assert that callers skip
    /// requests on their own.
    pub fn without_credential() -> Self {
        Self {
            has_credential: false,
            ..Self::new()
        }
    }

    /// Body returned by single-hash cache checks.
    pub async fn set_cached_response(&self, body: Value) {
        self.state.write().await.cached_response = body;
    }

    /// Body returned by batch cache checks.
    pub async fn set_batch_response(&self, body: Value) {
        self.state.write().await.batch_response = body;
    }

    /// Body returned by job creation, replacing the generated one.
    pub async fn set_create_response(&self, body: Value) {
        self.state.write().await.create_response = Some(body);
    }

    /// Body returned by the job listing.
    pub async fn set_list_response(&self, body: Value) {
        self.state.write().await.list_response = body;
    }

    pub async fn fail_cached_checks(&self, fail: bool) {
        self.state.write().await.fail_cached = fail;
    }

    pub async fn fail_batch_checks(&self, fail: bool) {
        self.state.write().await.fail_batch = fail;
    }

    pub async fn fail_job_creation(&self, fail: bool) {
        self.state.write().await.fail_create = fail;
    }

    pub async fn fail_list_jobs(&self, fail: bool) {
        self.state.write().await.fail_list = fail;
    }

    /// Number of single-hash cache checks made.
    pub async fn cached_check_count(&self) -> usize {
        self.state.read().await.cached_checks.len()
    }

    /// Number of batch cache checks made.
    pub async fn batch_check_count(&self) -> usize {
        self.state.read().await.batch_checks.len()
    }

    /// Hash lists sent with each batch cache check.
    pub async fn recorded_batches(&self) -> Vec<Vec<String>> {
        self.state.read().await.batch_checks.clone()
    }

    /// Successful job creation requests, in order.
    pub async fn created_jobs(&self) -> Vec<CreateJobRequest> {
        self.state.read().await.created.clone()
    }

    /// Number of job listing calls made.
    pub async fn list_call_count(&self) -> usize {
        self.state.read().await.list_calls
    }
}

fn simulated_failure(operation: &str) -> ProviderError {
    ProviderError::ApiError(format!("HTTP 500: simulated {} failure", operation))
}

#[async_trait]
impl DownloadProvider for MockDownloadProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn has_credential(&self) -> bool {
        self.has_credential
    }

    async fn check_cached(&self, info_hash: &str) -> Result<Value, ProviderError> {
        let mut state = self.state.write().await;
        state.cached_checks.push(info_hash.to_string());
        if state.fail_cached {
            return Err(simulated_failure("checkcached"));
        }
        Ok(state.cached_response.clone())
    }

    async fn check_cached_batch(&self, info_hashes: &[String]) -> Result<Value, ProviderError> {
        let mut state = self.state.write().await;
        state.batch_checks.push(info_hashes.to_vec());
        if state.fail_batch {
            return Err(simulated_failure("checkcached"));
        }
        Ok(state.batch_response.clone())
    }

    async fn create_job(&self, request: &CreateJobRequest) -> Result<Value, ProviderError> {
        let mut state = self.state.write().await;
        if state.fail_create {
            return Err(simulated_failure("createtorrent"));
        }
        state.created.push(request.clone());
        let response = state.create_response.clone().unwrap_or_else(|| {
            json!({
                "success": true,
                "detail": "Found Cached Torrent. Using Cached Torrent.",
                "data": { "torrent_id": 1000 + state.created.len() }
            })
        });
        Ok(response)
    }

    async fn list_jobs(&self, _offset: u32, _limit: u32) -> Result<Value, ProviderError> {
        let mut state = self.state.write().await;
        state.list_calls += 1;
        if state.fail_list {
            return Err(simulated_failure("mylist"));
        }
        Ok(state.list_response.clone())
    }
}
