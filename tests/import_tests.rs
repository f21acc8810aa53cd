//! Integration tests for a full import run against a mock catalog API.

use std::path::PathBuf;
use std::time::Duration;

use catalog_importer::{
    CatalogImporter, ClientConfig, DryRunCatalog, ImportError, ImportSettings, KlaviyoCatalog,
};
use serde_json::Value;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn importer_with_mock(mock_uri: &str) -> CatalogImporter<KlaviyoCatalog> {
    let mut config = ClientConfig::new("pk_test".to_string());
    config.base_url = mock_uri.to_string();
    config.max_retries = 0;
    config.max_delay = Duration::from_millis(10);
    CatalogImporter::new(KlaviyoCatalog::new(config).unwrap(), ImportSettings::default())
}

fn bodies(requests: &[Request], method_name: &str, url_path: &str) -> Vec<Value> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == method_name && r.url.path().starts_with(url_path))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn imports_fixture_into_empty_catalog() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let importer = importer_with_mock(&mock_server.uri());
    let summary = importer
        .run_file(fixtures_path().join("products.csv"))
        .await
        .unwrap();

    assert_eq!(summary.categories.created, 3);
    assert_eq!(summary.items.created, 2);
    assert_eq!(summary.variants.created, 3);

    let requests = mock_server.received_requests().await.unwrap();
    let items = bodies(&requests, "POST", "/catalog-items/");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["data"]["attributes"]["external_id"], "P1");
    assert_eq!(
        items[0]["data"]["attributes"]["custom_metadata"],
        serde_json::json!({ "brand": "Acme" })
    );

    let variants = bodies(&requests, "POST", "/catalog-variants/");
    assert_eq!(variants.len(), 3);

    let inherited = &variants[0]["data"]["attributes"];
    assert_eq!(inherited["sku"], "P1-RED-42");
    assert_eq!(inherited["price"], 19.99);
    assert_eq!(inherited["description"], "A red shoe");
    assert_eq!(inherited["inventory_policy"], 1);
    assert_eq!(inherited["inventory_quantity"], 5);
    assert_eq!(inherited["custom_metadata"], serde_json::json!({ "size": "42" }));

    let own = &variants[1]["data"]["attributes"];
    assert_eq!(own["price"], 24.5);
    assert_eq!(own["description"], "Roomy fit");
    assert_eq!(own["image_full_url"], "https://shop.test/p1-43.jpg");
    assert_eq!(own["url"], "https://shop.test/p1");
    assert_eq!(own["inventory_policy"], 2);

    assert_eq!(
        variants[2]["data"]["relationships"]["item"]["data"]["id"],
        "$custom:::$default:::P2"
    );
}

#[tokio::test]
async fn existing_entities_are_updated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/catalog-(items|variants)/.+/$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&mock_server)
        .await;

    let importer = importer_with_mock(&mock_server.uri());
    let summary = importer
        .run_file(fixtures_path().join("products.csv"))
        .await
        .unwrap();

    assert_eq!(summary.categories.already_existing, 3);
    assert_eq!(summary.items.updated, 2);
    assert_eq!(summary.variants.updated, 3);

    let requests = mock_server.received_requests().await.unwrap();
    let updates = bodies(&requests, "PATCH", "/catalog-variants/");
    let attrs = updates[0]["data"]["attributes"].as_object().unwrap();
    assert!(!attrs.contains_key("sku"));
    assert!(!attrs.contains_key("external_id"));
    assert!(updates[0]["data"].get("relationships").is_none());
    assert_eq!(updates[0]["data"]["id"], "$custom:::$default:::P1-RED-42");
}

#[tokio::test]
async fn api_failure_stops_the_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/catalog-categories/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/catalog-items/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let importer = importer_with_mock(&mock_server.uri());
    let err = importer
        .run_file(fixtures_path().join("products.csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Catalog { .. }));
    let requests = mock_server.received_requests().await.unwrap();
    assert!(bodies(&requests, "POST", "/catalog-variants/").is_empty());
}

#[tokio::test]
async fn dry_run_counts_requests() {
    let importer = CatalogImporter::new(DryRunCatalog::new(), ImportSettings::default());
    let summary = importer
        .run_file(fixtures_path().join("products.csv"))
        .await
        .unwrap();

    assert_eq!(summary.variants.created, 3);
    assert_eq!(importer.catalog().request_count(), 8);
}
