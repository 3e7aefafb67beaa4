use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub searcher: Option<SearcherConfig>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    4000
}

/// Searcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearcherConfig {
    /// Search backend type
    pub backend: SearcherBackend,
    /// Jackett-specific configuration (required when backend = "jackett")
    #[serde(default)]
    pub jackett: Option<JackettConfig>,
}

/// Available search backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearcherBackend {
    Jackett,
}

/// Jackett search backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://127.0.0.1:9117")
    #[serde(default = "default_jackett_url")]
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_jackett_timeout")]
    pub timeout_secs: u32,
}

fn default_jackett_url() -> String {
    "http://127.0.0.1:9117".to_string()
}

fn default_jackett_timeout() -> u32 {
    30
}

/// Download provider (TorBox) configuration.
///
/// Without an `api_token` cache lookups are skipped silently and job
/// creation fails with an upstream error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Timeout for every provider request, in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u32,
    /// Page size used when listing jobs during status polls.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

impl ProviderConfig {
    /// The bearer token, if one is configured and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_provider_url(),
            api_token: None,
            timeout_secs: default_provider_timeout(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_provider_url() -> String {
    "https://api.torbox.app".to_string()
}

fn default_provider_timeout() -> u32 {
    15
}

fn default_list_limit() -> u32 {
    1000
}

/// Source search tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// How many ranked candidates are kept before cache annotation.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
        }
    }
}

fn default_max_candidates() -> usize {
    60
}

/// Download lifecycle tracking.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleConfig {
    /// Interval between status polls of a stream subscription (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5000 // 5 seconds
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searcher: Option<SanitizedSearcherConfig>,
    pub provider: SanitizedProviderConfig,
    pub sources: SourcesConfig,
    pub lifecycle: LifecycleConfig,
}

/// Sanitized searcher config (API key redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearcherConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackett: Option<SanitizedJackettConfig>,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized provider config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProviderConfig {
    pub url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
    pub list_limit: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            searcher: config.searcher.as_ref().map(|s| SanitizedSearcherConfig {
                backend: match s.backend {
                    SearcherBackend::Jackett => "jackett".to_string(),
                },
                jackett: s.jackett.as_ref().map(|j| SanitizedJackettConfig {
                    url: j.url.clone(),
                    api_key_configured: !j.api_key.is_empty(),
                    timeout_secs: j.timeout_secs,
                }),
            }),
            provider: SanitizedProviderConfig {
                url: config.provider.url.clone(),
                api_token_configured: config.provider.token().is_some(),
                timeout_secs: config.provider.timeout_secs,
                list_limit: config.provider.list_limit,
            },
            sources: config.sources.clone(),
            lifecycle: config.lifecycle.clone(),
        }
    }
}
