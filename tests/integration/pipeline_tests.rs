//! Integration tests for a full run: discovery, product fetch and SQLite

use super::create_test_config;
use nemlig_catalog::pipeline;
use nemlig_catalog::storage::{RunStatus, SqliteStorage, Storage};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCT_PATH: &str = "/webapi/AAA-123/2026101612-60-1440/1/0/Products/GetByProductGroupId";

async fn mount_catalog(server: &MockServer, with_settings: bool) {
    let mut root = json!({
        "content": [
            {"ProductGroupId": "100", "TotalProducts": 3, "Heading": "Frugt", "Url": "/dagligvarer/frugt"},
            {"ProductGroupId": "200", "TotalProducts": 1, "Heading": "Mejeri"}
        ]
    });
    if with_settings {
        root["Settings"] = json!({
            "CombinedProductsAndSitecoreTimestamp": "AAA-123",
            "TimeslotUtc": "2026101612-60-1440"
        });
    }

    Mock::given(method("GET"))
        .and(path("/dagligvarer"))
        .and(query_param("GetAsJson", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(root))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dagligvarer/frugt"))
        .and(query_param("GetAsJson", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"ProductGroupId": "101", "TotalProducts": 4, "Heading": "Æbler"}]
        })))
        .mount(server)
        .await;
}

async fn mount_product_page(server: &MockServer, group: &str, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .and(query_param("productGroupId", group))
        .and(query_param("pageIndex", page.to_string().as_str()))
        .and(query_param("pageSize", "2"))
        .and(query_param("sortorder", "navn"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn products(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn database_path(dir: &TempDir) -> String {
    dir.path().join("catalog.db").to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_full_run_persists_catalog() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, true).await;

    mount_product_page(&mock_server, "100", 0, products(json!({"Products": [{"Id": "p1"}, {"Id": "p2"}]}))).await;
    mount_product_page(&mock_server, "100", 1, products(json!({"Products": [{"Id": "p3"}]}))).await;
    mount_product_page(&mock_server, "100", 2, products(json!({"Products": []}))).await;
    mount_product_page(&mock_server, "200", 0, products(json!([{"Id": "p2", "Price": 12.5}]))).await;
    mount_product_page(&mock_server, "200", 1, products(json!([]))).await;
    mount_product_page(&mock_server, "101", 0, ResponseTemplate::new(500)).await;

    let dir = TempDir::new().unwrap();
    let db_path = database_path(&dir);
    let config = create_test_config(&mock_server.uri(), &db_path);

    let report = pipeline::run(&config, "test-hash").await.expect("Run failed");

    assert_eq!(report.discovery.categories, 3);
    let product_stats = report.products.expect("Product stage skipped");
    assert_eq!(product_stats.categories, 3);
    assert_eq!(product_stats.products, 3);
    assert_eq!(product_stats.fetch_failures, 1);
    assert_eq!(product_stats.failed_categories, vec!["101"]);
    assert_eq!(report.merge.inserted, 3);

    mock_server.verify().await;

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    assert_eq!(storage.count_categories().unwrap(), 3);
    assert_eq!(storage.count_products().unwrap(), 3);
    assert_eq!(storage.count_current_history().unwrap(), 3);

    let run = storage.get_latest_run().unwrap().expect("No run recorded");
    assert_eq!(run.id, report.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.totals.categories, 3);
    assert_eq!(run.totals.products, 3);
    assert_eq!(run.totals.pages_fetched, 2 + 6);
    assert_eq!(run.totals.fetch_failures, 1);

    let tokens = storage.load_tokens(run.id).unwrap().expect("No tokens stored");
    assert_eq!(tokens.magic_stamp, "AAA-123");
    assert_eq!(tokens.page_size, 2);
}

#[tokio::test]
async fn test_disabled_product_stage_stores_categories_only() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, true).await;

    Mock::given(path_regex("^/webapi/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = database_path(&dir);
    let mut config = create_test_config(&mock_server.uri(), &db_path);
    config.products.enabled = false;

    let report = pipeline::run(&config, "test-hash").await.expect("Run failed");

    assert!(report.products.is_none());
    mock_server.verify().await;

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    assert_eq!(storage.count_categories().unwrap(), 3);
    assert_eq!(storage.count_products().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_tokens_skip_product_stage() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, false).await;

    Mock::given(path_regex("^/webapi/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = database_path(&dir);
    let config = create_test_config(&mock_server.uri(), &db_path);

    let report = pipeline::run(&config, "test-hash").await.expect("Run failed");

    assert!(report.products.is_none());
    assert_eq!(report.discovery.categories, 3);
    mock_server.verify().await;

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let run = storage.get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(storage.count_categories().unwrap(), 3);
}

#[tokio::test]
async fn test_repeated_runs_keep_product_history() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, true).await;

    // Same listing on both runs: one product per category
    for group in ["100", "200", "101"] {
        Mock::given(method("GET"))
            .and(path(PRODUCT_PATH))
            .and(query_param("productGroupId", group))
            .and(query_param("pageIndex", "0"))
            .respond_with(products(json!({"Products": [{"Id": format!("p{}", group)}]})))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(PRODUCT_PATH))
            .and(query_param("productGroupId", group))
            .and(query_param("pageIndex", "1"))
            .respond_with(products(json!({"Products": []})))
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let db_path = database_path(&dir);
    let config = create_test_config(&mock_server.uri(), &db_path);

    let first = pipeline::run(&config, "test-hash").await.expect("First run failed");
    let second = pipeline::run(&config, "test-hash").await.expect("Second run failed");

    assert_eq!(first.history.inserted, 3);
    assert_eq!(second.history.inserted, 0);
    assert_eq!(second.history.unchanged, 3);
    assert_eq!(second.merge.unchanged, 3);
    assert!(second.run_id > first.run_id);

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    assert_eq!(storage.count_runs().unwrap(), 2);
    assert_eq!(storage.count_history_rows().unwrap(), 3);
    assert_eq!(storage.count_products().unwrap(), 3);
}
