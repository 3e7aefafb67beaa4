use streamhub_core::{Config, DownloadTracker, SanitizedConfig, SourceFinder};

/// Shared application state
pub struct AppState {
    config: Config,
    sources: Option<SourceFinder>,
    downloads: DownloadTracker,
}

impl AppState {
    /// `sources` is `None` when no search backend is configured.
    pub fn new(config: Config, sources: Option<SourceFinder>, downloads: DownloadTracker) -> Self {
        Self {
            config,
            sources,
            downloads,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn sources(&self) -> Option<&SourceFinder> {
        self.sources.as_ref()
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }
}
