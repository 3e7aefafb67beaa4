//! Source search API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use streamhub_core::{SourceError, SourceSearchResult};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SourceSearchRequest {
    /// Missing is treated like blank and rejected with 400.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
}

/// POST /api/v1/sources/search
///
/// Search the aggregator for a title and return ranked candidates annotated
/// with their cache status.
pub async fn search_sources(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SourceSearchRequest>,
) -> Result<Json<SourceSearchResult>, (StatusCode, Json<ErrorResponse>)> {
    let Some(finder) = state.sources() else {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Search backend not configured",
        ));
    };

    match finder.find(&body.title, body.year).await {
        Ok(result) => Ok(Json(result)),
        Err(SourceError::Validation(msg)) => Err(error_response(StatusCode::BAD_REQUEST, msg)),
        Err(e @ SourceError::Upstream(_)) => {
            Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}
