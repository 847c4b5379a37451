//! Integration tests for `CepClient` using wiremock HTTP mocks.

use pedeja_geo::{CepClient, GeoError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CepClient {
    CepClient::with_base_url(30, "pedeja-test/0.1", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn lookup_returns_structured_address() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "cep": "52011-000",
        "logradouro": "Rua da Aurora",
        "bairro": "Boa Vista",
        "localidade": "Recife",
        "uf": "PE"
    });

    Mock::given(method("GET"))
        .and(path("/ws/52011000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let address = test_client(&server.uri())
        .lookup("52011000")
        .await
        .expect("should parse address");

    assert_eq!(address.street, "Rua da Aurora");
    assert_eq!(address.neighborhood, "Boa Vista");
    assert_eq!(address.city, "Recife");
    assert_eq!(address.state, "PE");
}

#[tokio::test]
async fn lookup_maps_erro_body_to_cep_not_found() {
    let server = MockServer::start().await;

    // ViaCEP answers 200 with an "erro" flag for unknown codes; the modern
    // API sends the string "true", older deployments a boolean.
    Mock::given(method("GET"))
        .and(path("/ws/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": "true"})))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).lookup("99999999").await;
    assert!(matches!(result, Err(GeoError::CepNotFound(cep)) if cep == "99999999"));
}

#[tokio::test]
async fn lookup_maps_boolean_erro_to_cep_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/00000000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": true})))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).lookup("00000000").await;
    assert!(matches!(result, Err(GeoError::CepNotFound(_))));
}

#[tokio::test]
async fn lookup_surfaces_http_status_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/52011000/json/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).lookup("52011000").await;
    assert!(matches!(result, Err(GeoError::HttpStatus { status: 500, .. })));
}

#[tokio::test]
async fn lookup_tolerates_missing_address_fields() {
    let server = MockServer::start().await;

    // Rural CEPs come back with only city and state populated.
    Mock::given(method("GET"))
        .and(path("/ws/55640000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "55640-000",
            "localidade": "Gravatá",
            "uf": "PE"
        })))
        .mount(&server)
        .await;

    let address = test_client(&server.uri())
        .lookup("55640000")
        .await
        .expect("should parse partial address");
    assert_eq!(address.street, "");
    assert_eq!(address.city, "Gravatá");
}
