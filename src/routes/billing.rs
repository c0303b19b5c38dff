use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    responses::JsonResponse,
    routes::{auth::AuthSession, json_body::JsonBody},
    services::{
        billing::{checkout_email, checkout_metadata, BillingError, CheckoutRequest},
        entitlement::is_subscribed,
    },
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub product_price_id: Option<String>,
    pub success_url: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdBody {
    pub user_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Price ids are accepted only in canonical hyphenated form.
fn is_hyphenated_uuid(raw: &str) -> bool {
    raw.len() == 36 && Uuid::parse_str(raw).is_ok()
}

fn parse_user_id(body: UserIdBody) -> Result<Uuid, &'static str> {
    let raw = non_empty(body.user_id).ok_or("User ID is required")?;
    Uuid::parse_str(&raw).map_err(|_| "Invalid user ID")
}

/// The body is validated before the caller's session so malformed requests
/// get a 400 whether or not they are signed in.
pub async fn create_checkout(
    State(state): State<AppState>,
    session: Result<AuthSession, Response>,
    JsonBody(body): JsonBody<CheckoutBody>,
) -> Response {
    let (Some(product_price_id), Some(success_url)) = (
        non_empty(body.product_price_id),
        non_empty(body.success_url),
    ) else {
        return JsonResponse::bad_request("Product price ID and success URL are required")
            .into_response();
    };

    if !is_hyphenated_uuid(&product_price_id) {
        return JsonResponse::bad_request("Invalid product price ID format. Must be a valid UUID.")
            .into_response();
    }

    let session = match session {
        Ok(session) => session,
        Err(rejection) => return rejection,
    };

    let email_candidate = body.customer_email.or_else(|| session.email.clone());
    let request = CheckoutRequest {
        product_price_id,
        success_url,
        customer_email: checkout_email(email_candidate.as_deref()),
        metadata: Some(checkout_metadata(body.metadata, &session.user_id.to_string())),
    };

    match state.billing.create_checkout(request).await {
        Ok(checkout) => {
            info!(user_id = %session.user_id, checkout_id = %checkout.id, "checkout created");
            Json(json!({ "sessionId": checkout.id, "url": checkout.url })).into_response()
        }
        Err(err) => {
            error!(?err, user_id = %session.user_id, "checkout creation failed");
            JsonResponse::server_error(&err.to_string()).into_response()
        }
    }
}

pub async fn check_subscription(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserIdBody>,
) -> Response {
    let user_id = match parse_user_id(body) {
        Ok(id) => id,
        Err(msg) => {
            return JsonResponse::error_with(
                StatusCode::BAD_REQUEST,
                msg,
                json!({ "isSubscribed": false }),
            )
            .into_response()
        }
    };

    let subscribed = is_subscribed(state.subscriptions.as_ref(), user_id).await;
    Json(json!({ "isSubscribed": subscribed })).into_response()
}

pub async fn manage_subscription(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserIdBody>,
) -> Response {
    let user_id = match parse_user_id(body) {
        Ok(id) => id,
        Err(msg) => return JsonResponse::bad_request(msg).into_response(),
    };

    let subscription = match state.subscriptions.find_active_for_user(user_id).await {
        Ok(Some(sub)) => sub,
        Ok(None) => {
            return JsonResponse::not_found("No active subscription found").into_response();
        }
        Err(err) => {
            error!(?err, %user_id, "subscription lookup failed");
            return JsonResponse::server_error("Error checking subscription status")
                .into_response();
        }
    };

    let Some(customer_id) = subscription.customer_id.as_deref() else {
        warn!(%user_id, polar_id = %subscription.polar_id, "active subscription has no customer id");
        return JsonResponse::server_error("Subscription has no billing customer").into_response();
    };

    match state.billing.create_portal_session(customer_id).await {
        Ok(url) => Json(json!({ "url": url })).into_response(),
        Err(BillingError::MissingConfiguration) => {
            error!("POLAR_ACCESS_TOKEN is not set");
            JsonResponse::server_error("Billing provider not configured").into_response()
        }
        Err(err) => {
            error!(?err, %user_id, "customer portal session failed");
            JsonResponse::server_error("Error managing subscription").into_response()
        }
    }
}
