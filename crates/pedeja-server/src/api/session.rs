use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    store: String,
    admin_key: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionData {
    token: String,
    store: String,
    expires_at: DateTime<Utc>,
}

/// Exchange a store's admin key for a session token.
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionData>>, ApiError> {
    if !state.admin_keys.verify(&request.store, &request.admin_key) {
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "wrong admin key for this store",
        ));
    }

    let session = state.sessions.login(&request.store).await;

    Ok(Json(ApiResponse {
        data: SessionData {
            token: session.token,
            store: session.store,
            expires_at: session.expires_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Invalidate the presented session token. Idempotent: an unknown or already
/// expired token still answers 204.
pub(super) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = token {
        state.sessions.invalidate(token).await;
    }

    StatusCode::NO_CONTENT
}
