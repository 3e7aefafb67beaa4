//! TorBox download provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;

use super::{CreateJobRequest, DownloadProvider, ProviderError};

/// TorBox API client.
pub struct TorBoxClient {
    client: Client,
    config: ProviderConfig,
}

impl TorBoxClient {
    /// Create a new TorBox client.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ProviderError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/api/torrents/{}", self.base_url(), path)
    }

    /// Attach the bearer token, failing if none is configured.
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        let token = self.config.token().ok_or(ProviderError::MissingCredential)?;
        Ok(builder.bearer_auth(token))
    }

    /// Send a request and parse the body as JSON.
    async fn send_json(&self, builder: RequestBuilder) -> Result<Value, ProviderError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else if e.is_connect() {
                ProviderError::ConnectionFailed(e.to_string())
            } else {
                ProviderError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ApiError(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("non-JSON body: {}", e)))
    }
}

#[async_trait]
impl DownloadProvider for TorBoxClient {
    fn name(&self) -> &str {
        "torbox"
    }

    fn has_credential(&self) -> bool {
        self.config.token().is_some()
    }

    async fn check_cached(&self, info_hash: &str) -> Result<Value, ProviderError> {
        debug!(hash = info_hash, "Checking TorBox cache");
        let builder = self.client.get(self.endpoint("checkcached")).query(&[
            ("hash", info_hash),
            ("format", "object"),
            ("list_files", "false"),
        ]);
        self.send_json(self.authorized(builder)?).await
    }

    async fn check_cached_batch(&self, info_hashes: &[String]) -> Result<Value, ProviderError> {
        debug!(count = info_hashes.len(), "Checking TorBox cache in bulk");
        let mut params: Vec<(&str, &str)> = info_hashes
            .iter()
            .map(|h| ("hash", h.as_str()))
            .collect();
        params.push(("format", "object"));
        params.push(("list_files", "false"));

        let builder = self.client.get(self.endpoint("checkcached")).query(&params);
        self.send_json(self.authorized(builder)?).await
    }

    async fn create_job(&self, request: &CreateJobRequest) -> Result<Value, ProviderError> {
        let mut form = multipart::Form::new()
            .text("magnet", request.magnet.clone())
            .text("allow_zip", "true");
        if let Some(name) = &request.name {
            form = form.text("name", name.clone());
        }
        if request.add_only_if_cached {
            form = form.text("add_only_if_cached", "true");
        }

        debug!(name = ?request.name, "Creating TorBox job");
        let builder = self.client.post(self.endpoint("createtorrent")).multipart(form);
        self.send_json(self.authorized(builder)?).await
    }

    async fn list_jobs(&self, offset: u32, limit: u32) -> Result<Value, ProviderError> {
        let offset = offset.to_string();
        let limit = limit.to_string();
        let builder = self
            .client
            .get(self.endpoint("mylist"))
            .query(&[("offset", offset.as_str()), ("limit", limit.as_str())]);
        self.send_json(self.authorized(builder)?).await
    }
}
