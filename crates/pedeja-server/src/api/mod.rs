mod checkout;
mod orders;
mod session;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pedeja_core::AppConfig;
use pedeja_geo::{DeliveryFeeResolver, GeoError, SettingsClient};
use pedeja_orders::{Dashboard, OrdersClient, OrdersError};

use crate::middleware::{request_id, require_session};
use crate::session::{AdminKeys, SessionStore};

/// Per-store dashboard state, keyed by store slug.
pub type Dashboards = Arc<Mutex<HashMap<String, Dashboard>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<DeliveryFeeResolver>,
    pub settings: Arc<SettingsClient>,
    pub orders: Arc<OrdersClient>,
    pub dashboards: Dashboards,
    pub sessions: SessionStore,
    pub admin_keys: AdminKeys,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "out_of_range" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Map resolver/collaborator failures to API errors. CEP problems are the
/// caller's fault; everything else is an upstream fault.
pub(super) fn map_geo_error(request_id: String, error: &GeoError) -> ApiError {
    match error {
        GeoError::InvalidCep(_) | GeoError::InvalidConfig(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        GeoError::CepNotFound(_) => ApiError::new(request_id, "not_found", error.to_string()),
        GeoError::GeocodeFailed { .. }
        | GeoError::BaseUrl(_)
        | GeoError::Http(_)
        | GeoError::HttpStatus { .. }
        | GeoError::Deserialize { .. } => {
            tracing::error!(error = %error, "geolocation collaborator failed");
            ApiError::new(request_id, "upstream_error", "geolocation lookup failed")
        }
    }
}

pub(super) fn map_orders_error(request_id: String, error: &OrdersError) -> ApiError {
    tracing::error!(error = %error, "orders upstream failed");
    ApiError::new(request_id, "upstream_error", "orders upstream failed")
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    environment: String,
}

async fn health(
    State(state): State<AppState>,
    axum::Extension(req_id): axum::Extension<crate::middleware::RequestId>,
) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            environment: state.config.env.to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Assemble the full router: public checkout/session routes plus the
/// session-gated dashboard routes.
pub fn build_app(state: AppState) -> Router {
    let gated = Router::new()
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/orders/clear-history", post(orders::clear_history))
        .layer(axum::middleware::from_fn_with_state(
            state.sessions.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/session", post(session::login).delete(session::logout))
        .route("/api/checkout/quote", post(checkout::quote))
        .route("/api/checkout", post(checkout::checkout))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors())
        .layer(axum::middleware::from_fn(request_id))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_codes_map_to_their_statuses() {
        for (code, status) in [
            ("not_found", StatusCode::NOT_FOUND),
            ("unauthorized", StatusCode::UNAUTHORIZED),
            ("bad_request", StatusCode::BAD_REQUEST),
            ("validation_error", StatusCode::BAD_REQUEST),
            ("conflict", StatusCode::CONFLICT),
            ("out_of_range", StatusCode::UNPROCESSABLE_ENTITY),
            ("upstream_error", StatusCode::BAD_GATEWAY),
        ] {
            let response = ApiError::new("req-1", code, "boom").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[test]
    fn unrecognized_error_code_maps_to_internal_server_error() {
        let response = ApiError::new("req-1", "mystery", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn geo_errors_map_to_caller_vs_upstream_faults() {
        let invalid = map_geo_error("req-1".into(), &GeoError::InvalidCep("12".into()));
        assert_eq!(invalid.error.code, "validation_error");

        let missing = map_geo_error("req-1".into(), &GeoError::CepNotFound("99999999".into()));
        assert_eq!(missing.error.code, "not_found");

        let outage = map_geo_error(
            "req-1".into(),
            &GeoError::GeocodeFailed {
                address: "Rua X".into(),
            },
        );
        assert_eq!(outage.error.code, "upstream_error");
    }
}
