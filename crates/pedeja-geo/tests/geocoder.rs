//! Integration tests for `GeocoderClient` using wiremock HTTP mocks.

use pedeja_geo::{GeoError, GeocoderClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeocoderClient {
    GeocoderClient::with_base_url(30, "pedeja-test/0.1", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_returns_first_match_with_parsed_coordinates() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        { "lat": "-8.0476", "lon": "-34.8770", "display_name": "Recife, PE" },
        { "lat": "-8.1000", "lon": "-34.9000", "display_name": "elsewhere" }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Rua da Aurora, Boa Vista, Recife - PE, Brasil"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let coordinate = test_client(&server.uri())
        .search("Rua da Aurora, Boa Vista, Recife - PE, Brasil")
        .await
        .expect("request should succeed")
        .expect("should find a match");

    assert!((coordinate.latitude - (-8.0476)).abs() < 1e-9);
    assert!((coordinate.longitude - (-34.8770)).abs() < 1e-9);
}

#[tokio::test]
async fn search_returns_none_on_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .search("Rua Inexistente, Lugar Nenhum")
        .await
        .expect("request should succeed");
    assert!(result.is_none());
}

#[tokio::test]
async fn search_returns_none_on_unparseable_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "not-a-number", "lon": "-34.9" }
        ])))
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .search("somewhere")
        .await
        .expect("request should succeed");
    assert!(result.is_none());
}

#[tokio::test]
async fn search_surfaces_http_status_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).search("somewhere").await;
    assert!(matches!(result, Err(GeoError::HttpStatus { status: 503, .. })));
}
