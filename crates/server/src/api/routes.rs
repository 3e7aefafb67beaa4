use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{downloads, handlers, middleware::metrics_middleware, sources};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Source discovery
        .route("/sources/search", post(sources::search_sources))
        // Download lifecycle
        .route(
            "/downloads",
            post(downloads::add_download).get(downloads::list_downloads),
        )
        .route("/downloads/{id}", get(downloads::get_download))
        .route("/downloads/{id}/stream", get(downloads::stream_download))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
