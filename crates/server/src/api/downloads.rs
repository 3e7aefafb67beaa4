//! Download lifecycle API handlers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use streamhub_core::{
    AddDownloadOutcome, AddDownloadRequest, DownloadEvent, DownloadRecord, LifecycleError,
};
use tracing::{debug, warn};

use super::handlers::{error_response, ErrorResponse};
use crate::metrics::SSE_STREAMS_TOTAL;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct DownloadListResponse {
    pub downloads: Vec<DownloadRecord>,
    pub total: usize,
}

fn lifecycle_error(err: LifecycleError) -> ApiError {
    let status = match &err {
        LifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
        LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
        LifecycleError::Upstream(_) => StatusCode::BAD_GATEWAY,
        LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

/// POST /api/v1/downloads
pub async fn add_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddDownloadRequest>,
) -> Result<(StatusCode, Json<AddDownloadOutcome>), ApiError> {
    let outcome = state.downloads().add(body).await.map_err(lifecycle_error)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/v1/downloads
pub async fn list_downloads(State(state): State<Arc<AppState>>) -> Json<DownloadListResponse> {
    let downloads = state.downloads().list().await;
    Json(DownloadListResponse {
        total: downloads.len(),
        downloads,
    })
}

/// GET /api/v1/downloads/{id}
pub async fn get_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadRecord>, ApiError> {
    state
        .downloads()
        .status(&id)
        .await
        .map(Json)
        .map_err(lifecycle_error)
}

/// GET /api/v1/downloads/{id}/stream
///
/// Server-sent events: one `update` per poll carrying the record, then a
/// final `done` once the download is terminal. Disconnecting stops polling.
pub async fn stream_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let subscription = state
        .downloads()
        .subscribe(&id)
        .await
        .map_err(lifecycle_error)?;
    SSE_STREAMS_TOTAL.inc();
    debug!(local_id = %id, "Download stream opened");

    let events = subscription.into_stream().map(|event| Ok(to_sse_event(event)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: DownloadEvent) -> Event {
    match event {
        DownloadEvent::Update(record) => match Event::default().event("update").json_data(&record) {
            Ok(event) => event,
            Err(e) => {
                warn!(local_id = %record.local_id, error = %e, "Failed to encode update");
                Event::default().event("update").data("{}")
            }
        },
        DownloadEvent::Done => Event::default().event("done").data("{}"),
    }
}
