//! Fulfillment webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, WebhookRequest, WebhookResponse};

/// `POST /webhook`: dispatch one dialogue-platform request.
///
/// The body is parsed regardless of `Content-Type`. Only a body that is not
/// valid JSON for the payload shape is rejected; everything else answers 200.
pub async fn fulfill(
    State(ctx): State<ApiContext>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let payload: WebhookRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {e}")))?;
    let req = payload.into_incoming();

    let fulfillment = ctx.handler.handle(&req).await;
    tracing::info!(
        intent = %req.intent_name,
        path = %fulfillment.path,
        "Webhook fulfilled"
    );

    Ok(Json(WebhookResponse {
        fulfillment_text: fulfillment.text,
    }))
}
