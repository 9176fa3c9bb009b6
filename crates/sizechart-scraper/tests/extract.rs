//! Integration tests for store orchestration: the full per-store
//! pipeline against a mocked storefront, store-level failure demotion,
//! and input-order preservation across concurrent stores.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sizechart_core::ExtractionConfig;
use sizechart_scraper::{extract_store, extract_stores};

/// Test configuration: short timeouts, no pacing delay, no retries.
fn test_config() -> ExtractionConfig {
    ExtractionConfig {
        max_products_per_store: 10,
        rate_limit_delay_secs: 0.0,
        timeout_secs: 5,
        concurrent_stores: 2,
        max_retries: 0,
        backoff_base_secs: 0,
        ..ExtractionConfig::default()
    }
}

const CHART_PAGE: &str = r"<html><body>
    <h1>Linen Shirt</h1>
    <div class='size-guide'>
      <table>
        <thead><tr><th>Size</th><th>Chest</th><th>Waist</th></tr></thead>
        <tbody>
          <tr><td>S</td><td>36</td><td>30</td></tr>
          <tr><td>M</td><td>38</td><td>32</td></tr>
        </tbody>
      </table>
    </div>
</body></html>";

/// Mounts a two-product storefront: one product with a chart, one
/// without. Discovery goes through the structured feed.
async fn mount_storefront(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "products": [{"handle": "linen-shirt"}, {"handle": "plain-tee"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/linen-shirt.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "product": {"title": "Linen Shirt"}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/linen-shirt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART_PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/plain-tee.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "product": {"title": "Plain Tee"}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/plain-tee"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>no tables here</p></body></html>"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn extract_store_runs_the_full_html_pipeline() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let result = extract_store(&test_config(), &server.uri()).await;

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert_eq!(
        result.products.len(),
        1,
        "only the product with a chart is kept"
    );
    assert_eq!(result.products[0].title, "Linen Shirt");
    assert_eq!(
        result.products[0].url,
        format!("{}/products/linen-shirt", server.uri())
    );
    let chart = result.products[0].size_chart.as_ref().expect("chart present");
    assert_eq!(chart.headers, vec!["Size", "Chest", "Waist"]);
    assert_eq!(chart.rows.len(), 2);
    assert!(!result.extraction_date.is_empty());
}

#[tokio::test]
async fn invalid_store_url_demotes_to_empty_result_with_error() {
    let result = extract_store(&test_config(), "###not a url###").await;

    assert!(result.products.is_empty());
    assert_eq!(result.errors.len(), 1, "exactly one store-level error");
    assert!(
        result.errors[0].contains("invalid store URL"),
        "unexpected error text: {}",
        result.errors[0]
    );
}

#[tokio::test]
async fn failed_discovery_demotes_to_empty_result_with_error() {
    let server = MockServer::start().await;
    for endpoint in ["/products.json", "/collections.json", "/sitemap.xml"] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
    }

    let result = extract_store(&test_config(), &server.uri()).await;

    assert!(result.products.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(
        result.errors[0].contains("discovery"),
        "unexpected error text: {}",
        result.errors[0]
    );
}

#[tokio::test]
async fn extract_stores_preserves_input_order() {
    // Three stores that fail fast, with distinct names; concurrency 2
    // means completion order could differ from input order.
    let stores = vec![
        "###first###".to_owned(),
        "###second###".to_owned(),
        "###third###".to_owned(),
    ];

    let results = extract_stores(&test_config(), &stores).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].store_name, "###first###");
    assert_eq!(results[1].store_name, "###second###");
    assert_eq!(results[2].store_name, "###third###");
    for result in &results {
        assert!(result.products.is_empty());
        assert_eq!(result.errors.len(), 1);
    }
}

#[tokio::test]
async fn one_failed_store_does_not_abort_its_siblings() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let stores = vec!["###broken###".to_owned(), server.uri()];
    let results = extract_stores(&test_config(), &stores).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].errors.len(), 1, "broken store carries its error");
    assert!(results[0].products.is_empty());
    assert_eq!(results[1].products.len(), 1, "healthy store still extracts");
    assert!(results[1].errors.is_empty());
}
