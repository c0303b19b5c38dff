use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    responses::JsonResponse,
    state::AppState,
    utils::signature::{check_signature, SignatureCheck},
};

pub const SIGNATURE_HEADER: &str = "polar-signature";

/// Billing-provider webhook. The raw body is kept so the signature can be
/// computed over exactly what was sent.
pub async fn polar_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let polar = &state.config.polar;
    let check = check_signature(polar.webhook_secret.as_deref(), signature, &body);
    info!(
        signature = check.as_str(),
        enforced = polar.enforce_signature,
        "billing webhook received"
    );

    if polar.enforce_signature {
        match check {
            SignatureCheck::Valid => {}
            SignatureCheck::Unconfigured => {
                error!("POLAR_WEBHOOK_SECRET is not set but signature enforcement is on");
                return JsonResponse::server_error("Webhook secret not configured")
                    .into_response();
            }
            SignatureCheck::Missing | SignatureCheck::Invalid => {
                warn!(signature = check.as_str(), "rejecting unsigned billing webhook");
                return JsonResponse::unauthorized("Invalid webhook signature").into_response();
            }
        }
    }

    match state.webhook_reconciler().handle_delivery(&body).await {
        Ok(receipt) => {
            info!(
                event_type = %receipt.event_type,
                outcome = ?receipt.outcome,
                "billing webhook processed"
            );
            JsonResponse::success(&format!(
                "Successfully processed {} event",
                receipt.event_type
            ))
            .into_response()
        }
        Err(failure) => {
            error!(error = %failure.error, event_id = ?failure.event_id, "billing webhook failed");
            JsonResponse::error_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                json!({
                    "message": failure.error.to_string(),
                    "event_id": failure.event_id,
                }),
            )
            .into_response()
        }
    }
}
