use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::session::SessionStore;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware gating the dashboard routes behind a live admin session.
///
/// A valid bearer token resolves to its [`crate::session::Session`], which is
/// inserted into request extensions so handlers know which store they act for.
pub async fn require_session(
    State(sessions): State<SessionStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    let session = match token {
        Some(token) => sessions.validate(token).await,
        None => None,
    };

    match session {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing, invalid, or expired session token",
                },
            }),
        )
            .into_response(),
    }
}

fn extract_bearer_token(header: Option<&HeaderValue>) -> Option<&str> {
    header
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_extracted() {
        let value = HeaderValue::from_static("Bearer abc123");
        assert_eq!(extract_bearer_token(Some(&value)), Some("abc123"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        assert_eq!(extract_bearer_token(None), None);
        let value = HeaderValue::from_static("Token abc123");
        assert_eq!(extract_bearer_token(Some(&value)), None);
        let value = HeaderValue::from_static("Bearer ");
        assert_eq!(extract_bearer_token(Some(&value)), None);
    }
}
