//! Integration tests for category discovery
//!
//! These tests use wiremock to serve the JSON category tree and run the
//! discovery crawl end-to-end over real HTTP.

use super::create_test_config;
use nemlig_catalog::crawler::{discover, FetchError, HttpFetcher, JsonClient};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a category page answering exactly `times` JSON requests
async fn mount_page(server: &MockServer, page_path: &str, body: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("GetAsJson", "1"))
        .and(query_param("sortorder", "navn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

fn root_page() -> serde_json::Value {
    json!({
        "content": [
            {"ProductGroupId": "100", "TotalProducts": 40, "Heading": "Frugt & grønt", "Url": "/dagligvarer/frugt-groent"},
            {"ProductGroupId": "200", "TotalProducts": 25, "Heading": "Mejeri", "Url": "/dagligvarer/mejeri"},
            {"Heading": "Banner without id", "Url": "https://elsewhere.example/promo"}
        ],
        "Settings": {
            "CombinedProductsAndSitecoreTimestamp": "AAA-123",
            "TimeslotUtc": "2026101612-60-1440"
        }
    })
}

#[tokio::test]
async fn test_full_discovery_over_http() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/dagligvarer", root_page(), 1).await;
    mount_page(
        &mock_server,
        "/dagligvarer/frugt-groent",
        json!({
            "content": [
                {"ProductGroupId": "100", "TotalProducts": 41, "Heading": ""},
                {"ProductGroupId": "101", "TotalProducts": 12, "Heading": "Æbler", "Url": "/dagligvarer/frugt-groent/aebler"},
                {"SeeMoreLink": {"Url": "/dagligvarer/mejeri"}}
            ],
            "Settings": {"CombinedProductsAndSitecoreTimestamp": "IGNORED"}
        }),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/dagligvarer/mejeri",
        json!({"content": [
            {"ProductGroupId": "200", "TotalProducts": 25, "Heading": "Mejeri"},
            {"ProductGroupId": "201", "TotalProducts": 7, "Heading": "Ost", "Url": "/dagligvarer/frugt-groent"}
        ]}),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/dagligvarer/frugt-groent/aebler",
        json!({"content": []}),
        1,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), ":memory:");
    let outcome = discover(&config).await.expect("Discovery failed");

    let ids: Vec<&str> = outcome
        .categories
        .iter()
        .map(|c| c.identifier.as_str())
        .collect();
    assert_eq!(ids, vec!["100", "200", "101", "201"]);

    // Larger count wins, empty heading keeps the earlier one
    assert_eq!(outcome.categories[0].total_count, 41);
    assert_eq!(outcome.categories[0].heading, "Frugt & grønt");

    assert_eq!(outcome.tokens.magic_stamp, "AAA-123");
    assert_eq!(outcome.tokens.timeslot, "2026101612-60-1440");
    assert_eq!(outcome.tokens.page_size, 2);

    assert_eq!(outcome.stats.pages_fetched, 4);
    assert_eq!(outcome.stats.distinct_paths, 3);
    assert_eq!(outcome.stats.empty_pages, 1);
    assert_eq!(outcome.stats.fetch_failures, 0);

    // Every page was requested exactly once
    mock_server.verify().await;
}

#[tokio::test]
async fn test_failing_category_page_does_not_stop_discovery() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/dagligvarer", root_page(), 1).await;
    Mock::given(method("GET"))
        .and(path("/dagligvarer/frugt-groent"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/dagligvarer/mejeri",
        json!({"content": [{"ProductGroupId": "201", "TotalProducts": 7, "Heading": "Ost"}]}),
        1,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), ":memory:");
    let outcome = discover(&config).await.expect("Discovery failed");

    assert_eq!(outcome.categories.len(), 3);
    assert_eq!(outcome.stats.fetch_failures, 1);
    assert_eq!(outcome.stats.failed_paths, vec!["/dagligvarer/frugt-groent"]);
    assert!(outcome.tokens.is_complete());
}

#[tokio::test]
async fn test_unreachable_root_yields_empty_catalog() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dagligvarer"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), ":memory:");
    let outcome = discover(&config).await.expect("Discovery failed");

    assert!(outcome.categories.is_empty());
    assert!(!outcome.tokens.is_complete());
    assert_eq!(outcome.stats.fetch_failures, 1);

    let document = serde_json::to_value(outcome.document()).unwrap();
    assert_eq!(document["productGroupIDs"], json!([]));
    assert_eq!(document["magicStamp"], json!(""));
}

#[tokio::test]
async fn test_requests_carry_referer_and_user_agent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/dagligvarer"))
        .and(header(
            "referer",
            format!("{}/dagligvarer?sortorder=navn", base_url).as_str(),
        ))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, ":memory:");
    let outcome = discover(&config).await.expect("Discovery failed");

    assert_eq!(outcome.stats.fetch_failures, 0);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dagligvarer"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Maintenance</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), ":memory:");
    let fetcher = HttpFetcher::from_config(&config.http, &config.site).unwrap();
    let url = format!("{}/dagligvarer?GetAsJson=1", mock_server.uri());

    let err = fetcher.get_json(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
    assert_eq!(err.url(), url);
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), ":memory:");
    let fetcher = HttpFetcher::from_config(&config.http, &config.site).unwrap();
    let url = format!("{}/dagligvarer/missing?GetAsJson=1", mock_server.uri());

    match fetcher.get_json(&url).await {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("Expected status error, got {:?}", other),
    }
}
