use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use pedeja_core::{OrderRecord, OrderStatus};

use crate::middleware::RequestId;
use crate::session::Session;

use super::{map_orders_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Current reconciled dashboard list for the session's store.
///
/// Reads the poller-maintained view; no upstream call happens here.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
) -> Json<ApiResponse<Vec<OrderRecord>>> {
    let dashboards = state.dashboards.lock().await;
    let data = dashboards
        .get(&session.store)
        .map(|dashboard| dashboard.orders().to_vec())
        .unwrap_or_default();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusUpdateRequest {
    status: OrderStatus,
}

/// Optimistically advance an order's status, then persist upstream.
///
/// The new status becomes visible in the dashboard before the upstream PUT
/// resolves; a failed write reverts it and triggers an immediate refetch so
/// the view resynchronizes without waiting for the next poll tick.
pub(super) async fn update_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
    Path(order_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<OrderRecord>>, ApiError> {
    {
        let mut dashboards = state.dashboards.lock().await;
        let dashboard = dashboards.entry(session.store.clone()).or_default();

        let known = dashboard
            .orders()
            .iter()
            .any(|order| order.id == order_id);
        if !known {
            return Err(ApiError::new(req_id.0, "not_found", "unknown order"));
        }

        if dashboard.begin_update(&order_id, request.status).is_none() {
            return Err(ApiError::new(
                req_id.0,
                "conflict",
                "a status update for this order is already in flight",
            ));
        }
    }

    let write = state.orders.update_status(&order_id, request.status).await;
    let success = write.is_ok();

    let refetch = {
        let mut dashboards = state.dashboards.lock().await;
        if let Some(dashboard) = dashboards.get_mut(&session.store) {
            dashboard.complete_update(&order_id, success);
            dashboard.take_refetch_request()
        } else {
            false
        }
    };

    if refetch {
        refresh_now(&state, &session.store).await;
    }

    if let Err(error) = write {
        return Err(map_orders_error(req_id.0, &error));
    }

    let dashboards = state.dashboards.lock().await;
    let record = dashboards
        .get(&session.store)
        .and_then(|dashboard| {
            dashboard
                .orders()
                .iter()
                .find(|order| order.id == order_id)
                .cloned()
        })
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "unknown order"))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Remove all closed orders upstream, then resynchronize the local view.
pub(super) async fn clear_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .orders
        .clear_history(&session.store)
        .await
        .map_err(|e| map_orders_error(req_id.0.clone(), &e))?;

    refresh_now(&state, &session.store).await;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "cleared": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Best-effort immediate refetch; a failure here is logged and left for the
/// next poll tick to repair.
async fn refresh_now(state: &AppState, store: &str) {
    match state.orders.list_orders(store).await {
        Ok(fresh) => {
            let mut dashboards = state.dashboards.lock().await;
            dashboards.entry(store.to_string()).or_default().apply_poll(fresh);
        }
        Err(error) => {
            tracing::warn!(store, error = %error, "immediate refetch failed");
        }
    }
}
