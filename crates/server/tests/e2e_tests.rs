//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full server stack in-process with mock implementations
//! for the external services (Jackett, TorBox).

mod common;

use axum::http::StatusCode;
use serde_json::json;
use streamhub_core::SearchError;

use common::{fixtures, TestConfig, TestFixture};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["time"].is_string());
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["server"]["port"], 4000);
    assert_eq!(response.body["provider"]["api_token_configured"], false);
    assert!(response.body["provider"].get("api_token").is_none());
    assert_eq!(response.body["sources"]["max_candidates"], 60);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("streamhub_http_requests_total"));
    assert!(body.contains("streamhub_downloads_by_status"));
}

// =============================================================================
// Source Search Tests
// =============================================================================

#[tokio::test]
async fn test_source_search_ranks_and_annotates() {
    let fixture = TestFixture::new().await;
    fixture
        .searcher
        .set_results(vec![
            fixtures::movie_candidate("Heat", 1995, "720p", HASH_A),
            fixtures::movie_candidate("Heat", 1995, "2160p REMUX", HASH_B),
        ])
        .await;
    fixture
        .provider
        .set_batch_response(json!({ "data": { HASH_A: { "found": true } } }))
        .await;

    let response = fixture
        .post("/api/v1/sources/search", json!({ "title": "Heat", "year": 1995 }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["query"], "Heat 1995");
    assert_eq!(response.body["count"], 2);

    let results = response.body["results"].as_array().unwrap();
    assert_eq!(results[0]["title"], "Heat 1995 2160p REMUX");
    assert_eq!(results[0]["info_hash"], HASH_B);
    assert_eq!(results[0]["cached"], false);
    assert_eq!(results[1]["cached"], true);
    assert_eq!(results[1]["size_human"], "2.00 GB");
    assert!(results[0]["score"].as_f64().unwrap() > results[1]["score"].as_f64().unwrap());

    assert_eq!(fixture.searcher.recorded_queries().await, vec!["Heat 1995".to_string()]);
}

#[tokio::test]
async fn test_source_search_excludes_candidates_without_magnet() {
    let fixture = TestFixture::new().await;
    let mut torrent_only = fixtures::candidate("Heat 1995 2160p", HASH_A);
    torrent_only.magnet_uri = None;
    torrent_only.link = Some("http://jackett/dl/1.torrent".to_string());
    fixture
        .searcher
        .set_results(vec![torrent_only, fixtures::candidate("Heat 1995 720p", HASH_B)])
        .await;

    let response = fixture
        .post("/api/v1/sources/search", json!({ "title": "Heat" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["results"][0]["info_hash"], HASH_B);
}

#[tokio::test]
async fn test_source_search_blank_title() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/sources/search", json!({ "title": "  " }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
    assert_eq!(fixture.searcher.search_count().await, 0);
}

#[tokio::test]
async fn test_source_search_missing_title() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/sources/search", json!({ "year": 1995 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "title is required");
    assert_eq!(fixture.searcher.search_count().await, 0);
}

#[tokio::test]
async fn test_source_search_upstream_failure() {
    let fixture = TestFixture::new().await;
    fixture
        .searcher
        .set_next_error(SearchError::ConnectionFailed("connection refused".to_string()))
        .await;

    let response = fixture
        .post("/api/v1/sources/search", json!({ "title": "Heat" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_source_search_without_searcher() {
    let fixture = TestFixture::with_config(TestConfig::without_searcher()).await;
    let response = fixture
        .post("/api/v1/sources/search", json!({ "title": "Heat" }))
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_source_search_malformed_json() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/sources/search", "{not json").await;
    assert!(response.status.is_client_error());
}

// =============================================================================
// Download Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_add_download() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_cached_response(json!({ "data": { HASH_A: { "name": "Heat" } } }))
        .await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!({ "magnet": fixtures::magnet(HASH_A), "name": "Heat (1995)" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["local_id"].is_string());
    assert_eq!(response.body["cached"]["data"][HASH_A]["name"], "Heat");
    assert_eq!(response.body["provider"]["success"], true);

    let created = fixture.provider.created_jobs().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name.as_deref(), Some("Heat (1995)"));
}

#[tokio::test]
async fn test_add_download_requires_magnet() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/downloads", json!({ "magnet": "" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(fixture.provider.created_jobs().await.is_empty());
}

#[tokio::test]
async fn test_add_download_missing_magnet() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/downloads", json!({ "name": "x" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid request: magnet is required");
    assert!(fixture.provider.created_jobs().await.is_empty());
}

#[tokio::test]
async fn test_add_download_only_cached() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/downloads",
            json!({ "magnet": fixtures::magnet(HASH_A), "only_cached": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let created = fixture.provider.created_jobs().await;
    assert_eq!(created.len(), 1);
    assert!(created[0].add_only_if_cached);
}

#[tokio::test]
async fn test_add_download_provider_failure() {
    let fixture = TestFixture::new().await;
    fixture.provider.fail_job_creation(true).await;

    let response = fixture
        .post("/api/v1/downloads", json!({ "magnet": fixtures::magnet(HASH_A) }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    let list = fixture.get("/api/v1/downloads").await;
    assert_eq!(list.body["total"], 0);
}

#[tokio::test]
async fn test_get_unknown_download() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/downloads/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_before_and_after_provider_lists_job() {
    let fixture = TestFixture::new().await;
    fixture
        .provider
        .set_create_response(json!({ "success": true, "detail": "queued" }))
        .await;

    let added = fixture
        .post("/api/v1/downloads", json!({ "magnet": fixtures::magnet(HASH_A) }))
        .await;
    let local_id = added.body["local_id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/downloads/{}", local_id);

    let before = fixture.get(&path).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["status"], "initializing");
    assert!(before.body.get("upstream_id").is_none());

    fixture
        .provider
        .set_list_response(json!({ "data": [ { "id": 77, "hash": HASH_A, "status": "downloading" } ] }))
        .await;

    let after = fixture.get(&path).await;
    assert_eq!(after.body["status"], "downloading");
    assert_eq!(after.body["upstream_id"], "77");
}

#[tokio::test]
async fn test_list_downloads() {
    let fixture = TestFixture::new().await;
    for hash in [HASH_A, HASH_B] {
        fixture
            .post("/api/v1/downloads", json!({ "magnet": fixtures::magnet(hash) }))
            .await;
    }

    let response = fixture.get("/api/v1/downloads").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["downloads"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stream_emits_updates_then_done() {
    let fixture = TestFixture::new().await;
    let added = fixture
        .post("/api/v1/downloads", json!({ "magnet": fixtures::magnet(HASH_A) }))
        .await;
    let local_id = added.body["local_id"].as_str().unwrap().to_string();

    fixture
        .provider
        .set_list_response(fixtures::job_listing(&[fixtures::job_entry(1001, HASH_A, 100.0)]))
        .await;

    let (status, body) = fixture
        .get_text(&format!("/api/v1/downloads/{}/stream", local_id))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("event: update"));
    assert!(body.contains("\"status\":\"completed\""));
    assert!(body.contains(&local_id));
    assert_eq!(body.matches("event: done").count(), 1);
    assert!(body.trim_end().ends_with("data: {}"));
}

#[tokio::test]
async fn test_stream_unknown_download() {
    let fixture = TestFixture::new().await;
    let (status, _) = fixture.get_text("/api/v1/downloads/nope/stream").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
