use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamhub_core::{
    load_config, validate_config, CacheStatusResolver, Config, DownloadProvider, DownloadTracker,
    JackettSearcher, MemoryDownloadStore, SearcherBackend, Searcher, SourceFinder, TorBoxClient,
};
use streamhub_server::api::create_router;
use streamhub_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("STREAMHUB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Download provider
    let provider: Arc<dyn DownloadProvider> = Arc::new(
        TorBoxClient::new(config.provider.clone()).context("Failed to create TorBox client")?,
    );
    if provider.has_credential() {
        info!("TorBox provider configured at {}", config.provider.url);
    } else {
        warn!("No TorBox API token configured: cache lookups are skipped and downloads will fail");
    }

    let sources = create_source_finder(&config, Arc::clone(&provider))?;

    let downloads = DownloadTracker::new(Arc::new(MemoryDownloadStore::new()), provider)
        .with_poll_interval(Duration::from_millis(config.lifecycle.poll_interval_ms))
        .with_list_limit(config.provider.list_limit);

    // Create app state and router
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, sources, downloads));
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Build the source finder if a search backend is configured.
fn create_source_finder(
    config: &Config,
    provider: Arc<dyn DownloadProvider>,
) -> Result<Option<SourceFinder>> {
    let Some(searcher_config) = &config.searcher else {
        info!("No searcher configured, source search disabled");
        return Ok(None);
    };

    let searcher: Arc<dyn Searcher> = match searcher_config.backend {
        SearcherBackend::Jackett => {
            let Some(jackett_config) = &searcher_config.jackett else {
                error!("Jackett backend selected but no jackett config provided");
                return Ok(None);
            };
            info!("Initializing Jackett searcher at {}", jackett_config.url);
            Arc::new(
                JackettSearcher::new(jackett_config.clone())
                    .context("Failed to create Jackett searcher")?,
            )
        }
    };

    let finder = SourceFinder::new(searcher, CacheStatusResolver::new(provider))
        .with_max_candidates(config.sources.max_candidates);
    Ok(Some(finder))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
