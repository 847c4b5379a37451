//! End-to-end resolver scenarios against mocked CEP and geocoder services.

use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pedeja_core::{
    Coordinate, DeliveryDecision, DeliveryFeeTier, GeofenceEnforcement, StoreDeliveryConfig,
};
use pedeja_geo::{haversine, CepClient, DeliveryFeeResolver, GeoError, GeocoderClient};

const ORIGIN: Coordinate = Coordinate {
    latitude: -8.0476,
    longitude: -34.8770,
};

/// One degree of latitude is ~111.195 km under the 6371 km Earth radius, so
/// these offsets land the customer almost exactly 4 km / 7 km due north.
const LAT_4KM_AWAY: f64 = -8.0476 + 4.0 / 111.195;
const LAT_7KM_AWAY: f64 = -8.0476 + 7.0 / 111.195;

fn store_config() -> StoreDeliveryConfig {
    StoreDeliveryConfig {
        origin: Some(ORIGIN),
        max_radius_km: 5.0,
        tiers: vec![
            DeliveryFeeTier {
                max_distance_km: 3.0,
                fee: Decimal::from(5),
            },
            DeliveryFeeTier {
                max_distance_km: 6.0,
                fee: Decimal::from(10),
            },
        ],
        out_of_tier_fee: Decimal::ZERO,
    }
}

fn resolver(
    cep_url: &str,
    geocoder_url: &str,
    enforcement: GeofenceEnforcement,
) -> DeliveryFeeResolver {
    let cep = CepClient::with_base_url(30, "pedeja-test/0.1", cep_url).unwrap();
    let geocoder = GeocoderClient::with_base_url(30, "pedeja-test/0.1", geocoder_url).unwrap();
    DeliveryFeeResolver::new(cep, geocoder, enforcement)
}

async fn mount_cep(server: &MockServer, cep: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/ws/{cep}/json/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": cep,
            "logradouro": "Rua do Futuro",
            "bairro": "Graças",
            "localidade": "Recife",
            "uf": "PE"
        })))
        .mount(server)
        .await;
}

async fn mount_geocoder(server: &MockServer, latitude: f64, longitude: f64) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": latitude.to_string(), "lon": longitude.to_string() }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn customer_four_km_away_pays_the_six_km_tier() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52050000").await;
    mount_geocoder(&geo_server, LAT_4KM_AWAY, ORIGIN.longitude).await;

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "52050-000")
    .await
    .expect("resolution should succeed");

    match decision {
        DeliveryDecision::Allowed { fee, distance_km } => {
            assert_eq!(fee, Decimal::from(10));
            assert!((distance_km - 4.0).abs() < 0.05, "got {distance_km} km");
        }
        other => panic!("expected Allowed, got {other:?}"),
    }
}

#[tokio::test]
async fn customer_seven_km_away_is_out_of_range() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "53400000").await;
    mount_geocoder(&geo_server, LAT_7KM_AWAY, ORIGIN.longitude).await;

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "53400-000")
    .await
    .expect("resolution should succeed");

    match decision {
        DeliveryDecision::Rejected {
            distance_km,
            max_radius_km,
        } => {
            assert!((distance_km - 7.0).abs() < 0.05, "got {distance_km} km");
            assert!((max_radius_km - 5.0).abs() < f64::EPSILON);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(!decision.permits_checkout());
}

#[tokio::test]
async fn distance_just_inside_the_radius_is_allowed() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52060000").await;
    mount_geocoder(&geo_server, -8.0476 + 4.999 / 111.195, ORIGIN.longitude).await;

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "52060-000")
    .await
    .expect("resolution should succeed");

    assert!(matches!(decision, DeliveryDecision::Allowed { .. }));
}

#[tokio::test]
async fn distance_exactly_equal_to_the_radius_is_allowed() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52060000").await;

    let customer = Coordinate {
        latitude: LAT_4KM_AWAY,
        longitude: ORIGIN.longitude,
    };
    mount_geocoder(&geo_server, customer.latitude, customer.longitude).await;

    // Rejection requires distance strictly greater than the radius, so a
    // radius set to the exact computed distance must still deliver.
    let config = StoreDeliveryConfig {
        max_radius_km: haversine::distance_km(ORIGIN, customer),
        ..store_config()
    };

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&config, "52060-000")
    .await
    .expect("resolution should succeed");

    assert!(matches!(decision, DeliveryDecision::Allowed { .. }));
}

#[tokio::test]
async fn unconfigured_geofence_short_circuits_without_lookups() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;

    // Any request to either collaborator fails the test.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&cep_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&geo_server)
        .await;

    let config = StoreDeliveryConfig {
        origin: None,
        ..store_config()
    };

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&config, "52050-000")
    .await
    .expect("resolution should succeed");

    assert_eq!(decision, DeliveryDecision::Undetermined);
    assert!(decision.permits_checkout());
}

#[tokio::test]
async fn malformed_cep_blocks_before_any_lookup() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;

    let result = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "1234")
    .await;

    assert!(matches!(result, Err(GeoError::InvalidCep(_))));
}

#[tokio::test]
async fn unknown_cep_blocks_checkout() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": "true"})))
        .mount(&cep_server)
        .await;

    let result = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "99999-999")
    .await;

    assert!(matches!(result, Err(GeoError::CepNotFound(_))));
}

#[tokio::test]
async fn geocoder_miss_fails_open_under_best_effort() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52050000").await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&geo_server)
        .await;

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "52050-000")
    .await
    .expect("best-effort must not fail on a geocoder miss");

    assert_eq!(decision, DeliveryDecision::Undetermined);
}

#[tokio::test]
async fn geocoder_outage_fails_open_under_best_effort() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52050000").await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&geo_server)
        .await;

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&store_config(), "52050-000")
    .await
    .expect("best-effort must not fail on a geocoder outage");

    assert_eq!(decision, DeliveryDecision::Undetermined);
}

#[tokio::test]
async fn geocoder_miss_fails_closed_under_strict() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52050000").await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&geo_server)
        .await;

    let result = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::Strict,
    )
    .resolve(&store_config(), "52050-000")
    .await;

    assert!(matches!(result, Err(GeoError::GeocodeFailed { .. })));
}

#[tokio::test]
async fn exhausted_tiers_within_radius_fall_back_to_out_of_tier_fee() {
    let cep_server = MockServer::start().await;
    let geo_server = MockServer::start().await;
    mount_cep(&cep_server, "52050000").await;
    mount_geocoder(&geo_server, LAT_4KM_AWAY, ORIGIN.longitude).await;

    // Single 3 km tier with a 5 km radius: a 4 km delivery is allowed but
    // beyond the tier table.
    let config = StoreDeliveryConfig {
        tiers: vec![DeliveryFeeTier {
            max_distance_km: 3.0,
            fee: Decimal::from(5),
        }],
        out_of_tier_fee: Decimal::from(15),
        ..store_config()
    };

    let decision = resolver(
        &cep_server.uri(),
        &geo_server.uri(),
        GeofenceEnforcement::BestEffort,
    )
    .resolve(&config, "52050-000")
    .await
    .expect("resolution should succeed");

    match decision {
        DeliveryDecision::Allowed { fee, .. } => assert_eq!(fee, Decimal::from(15)),
        other => panic!("expected Allowed, got {other:?}"),
    }
}
