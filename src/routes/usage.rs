use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::{
    responses::JsonResponse,
    routes::auth::AuthSession,
    services::entitlement::is_subscribed,
    state::AppState,
    utils::usage_limits::{UsageSnapshot, UsageTier},
};

/// Remaining generations for the caller. Guests get a fixed, non-durable
/// allowance; signed-in users are counted against their saved records.
pub async fn get_usage(State(state): State<AppState>, session: Option<AuthSession>) -> Response {
    let Some(session) = session else {
        return Json(UsageSnapshot::guest()).into_response();
    };

    let subscribed = is_subscribed(state.subscriptions.as_ref(), session.user_id).await;
    let tier = UsageTier::for_session(subscribed);

    match state.headshots.count_for_user(session.user_id).await {
        Ok(used) => Json(UsageSnapshot::for_tier(tier, used)).into_response(),
        Err(err) => {
            error!(?err, user_id = %session.user_id, "failed to count headshots");
            JsonResponse::server_error("Failed to load usage").into_response()
        }
    }
}
