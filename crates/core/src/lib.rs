pub mod config;
pub mod lifecycle;
pub mod magnet;
pub mod metrics;
pub mod provider;
pub mod searcher;
pub mod sources;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LifecycleConfig,
    ProviderConfig, SanitizedConfig, SearcherBackend, SearcherConfig, SourcesConfig,
};
pub use lifecycle::{
    AddDownloadOutcome, AddDownloadRequest, DownloadEvent, DownloadRecord, DownloadStatus,
    DownloadStore, DownloadSubscription, DownloadTracker, LifecycleError, MemoryDownloadStore,
};
pub use magnet::{extract_info_hash, is_magnet};
pub use provider::{
    CacheStatusMap, CacheStatusResolver, CreateJobRequest, DownloadProvider, ProviderError,
    TorBoxClient,
};
pub use searcher::{
    rank_candidates, AnnotatedCandidate, Candidate, JackettSearcher, RankedCandidate,
    SearchError, SearchQuery, Searcher,
};
pub use sources::{SourceError, SourceFinder, SourceSearchResult};
