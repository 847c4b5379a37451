use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use pedeja_core::{whatsapp, DeliveryDecision, OrderDraft};

use crate::middleware::RequestId;

use super::{map_geo_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct QuoteRequest {
    store: String,
    cep: String,
}

/// Quote deliverability and fee for a CEP before the customer commits.
///
/// Always answers 200 with the decision when the pipeline ran; rejection is
/// data, not an error. CEP validation failures are the only 4xx cases.
pub(super) async fn quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<DeliveryDecision>>, ApiError> {
    let settings = state
        .settings
        .fetch(&request.store)
        .await
        .map_err(|e| map_geo_error(req_id.0.clone(), &e))?;

    let decision = state
        .resolver
        .resolve(&settings.delivery, &request.cep)
        .await
        .map_err(|e| map_geo_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: decision,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutRequest {
    store: String,
    cep: String,
    #[serde(flatten)]
    draft: OrderDraft,
}

#[derive(Debug, Serialize)]
pub(super) struct CheckoutData {
    decision: DeliveryDecision,
    message: String,
    whatsapp_link: String,
}

/// Finish checkout: resolve the fee, then hand back the pre-filled WhatsApp
/// message and link. An out-of-range address blocks the order.
pub(super) async fn checkout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutData>>, ApiError> {
    let settings = state
        .settings
        .fetch(&request.store)
        .await
        .map_err(|e| map_geo_error(req_id.0.clone(), &e))?;

    let decision = state
        .resolver
        .resolve(&settings.delivery, &request.cep)
        .await
        .map_err(|e| map_geo_error(req_id.0.clone(), &e))?;

    if let DeliveryDecision::Rejected {
        distance_km,
        max_radius_km,
    } = decision
    {
        return Err(ApiError::new(
            req_id.0,
            "out_of_range",
            format!(
                "address is {distance_km:.1} km away; the store delivers up to {max_radius_km:.1} km"
            ),
        ));
    }

    let message = whatsapp::checkout_message(&settings.name, &request.draft, &decision);
    let whatsapp_link = whatsapp::checkout_link(&settings.whatsapp_phone, &message);

    Ok(Json(ApiResponse {
        data: CheckoutData {
            decision,
            message,
            whatsapp_link,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
