//! HTTP client integration tests.
//!
//! The Jackett and TorBox clients are pointed at local wiremock servers to
//! verify request construction and response handling without real services.

mod jackett {
    use serde_json::json;
    use streamhub_core::config::JackettConfig;
    use streamhub_core::{JackettSearcher, SearchError, SearchQuery, Searcher};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PATH: &str = "/api/v2.0/indexers/all/results";

    fn searcher(server: &MockServer) -> JackettSearcher {
        JackettSearcher::new(JackettConfig {
            url: server.uri(),
            api_key: "secret-key".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RESULTS_PATH))
            .and(query_param("apikey", "secret-key"))
            .and(query_param("Query", "Heat 1995"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Results": [
                    {
                        "Title": "Heat 1995 1080p BluRay x264",
                        "MagnetUri": "magnet:?xt=urn:btih:ABC123",
                        "Link": "http://jackett/dl/1",
                        "Size": 8589934592i64,
                        "Seeders": 120,
                        "Peers": 140,
                        "Tracker": "TrackerOne",
                        "CategoryDesc": "Movies/HD",
                        "PublishDate": "2020-01-01T00:00:00Z",
                        "Details": "http://tracker/1"
                    },
                    {
                        "Title": "Heat 1995 720p",
                        "MagnetUri": null,
                        "Link": "http://jackett/dl/2",
                        "Size": null,
                        "Seeders": null,
                        "Peers": 3,
                        "Tracker": "TrackerTwo",
                        "CategoryDesc": ["Movies", "Movies/SD"]
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = searcher(&server)
            .search(&SearchQuery::from_title("Heat", Some(1995)))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].seeders, 120);
        assert_eq!(found[0].size_bytes, Some(8_589_934_592));
        assert_eq!(found[0].categories, vec!["Movies/HD".to_string()]);
        assert!(found[0].publish_date.is_some());
        assert!(found[1].magnet_uri.is_none());
        assert_eq!(found[1].seeders, 0);
        assert_eq!(found[1].categories.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_results_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RESULTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Indexers": [] })))
            .mount(&server)
            .await;

        let found = searcher(&server).search(&SearchQuery::new("x")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RESULTS_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad api key"))
            .mount(&server)
            .await;

        let result = searcher(&server).search(&SearchQuery::new("x")).await;
        match result {
            Err(SearchError::ApiError(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("bad api key"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failure() {
        let searcher = JackettSearcher::new(JackettConfig {
            url: "http://127.0.0.1:1".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 5,
        })
        .unwrap();

        let result = searcher.search(&SearchQuery::new("x")).await;
        assert!(matches!(result, Err(SearchError::ConnectionFailed(_))));
    }
}

mod torbox {
    use serde_json::json;
    use streamhub_core::{
        CreateJobRequest, DownloadProvider, ProviderConfig, ProviderError, TorBoxClient,
    };
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TorBoxClient {
        TorBoxClient::new(ProviderConfig {
            url: server.uri(),
            api_token: Some("tb-token".to_string()),
            timeout_secs: 5,
            list_limit: 1000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_check_cached_sends_bearer_and_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/torrents/checkcached"))
            .and(header("authorization", "Bearer tb-token"))
            .and(query_param("hash", "abc123"))
            .and(query_param("format", "object"))
            .and(query_param("list_files", "false"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": { "abc123": { "name": "x" } } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).check_cached("abc123").await.unwrap();
        assert_eq!(body["data"]["abc123"]["name"], "x");
    }

    #[tokio::test]
    async fn test_batch_check_repeats_hash_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/torrents/checkcached"))
            .and(query_param("hash", "aaa"))
            .and(query_param("hash", "bbb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .check_cached_batch(&["aaa".to_string(), "bbb".to_string()])
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let hashes: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "hash")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(hashes, vec!["aaa", "bbb"]);
    }

    #[tokio::test]
    async fn test_create_job_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/api/torrents/createtorrent"))
            .and(header("authorization", "Bearer tb-token"))
            .and(body_string_contains("magnet:?xt=urn:btih:abc123"))
            .and(body_string_contains("name=\"allow_zip\""))
            .and(body_string_contains("Heat (1995)"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": { "torrent_id": 42 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .create_job(&CreateJobRequest::new("magnet:?xt=urn:btih:abc123").with_name("Heat (1995)"))
            .await
            .unwrap();
        assert_eq!(response["data"]["torrent_id"], 42);

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(!body.contains("add_only_if_cached"));
    }

    #[tokio::test]
    async fn test_list_jobs_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/torrents/mylist"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).list_jobs(0, 1000).await.unwrap();
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_truncates_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/torrents/mylist"))
            .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(1000)))
            .mount(&server)
            .await;

        match client(&server).list_jobs(0, 10).await {
            Err(ProviderError::ApiError(msg)) => {
                assert!(msg.contains("503"));
                assert!(msg.len() < 300);
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/torrents/checkcached"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = client(&server).check_cached("abc").await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }
}
