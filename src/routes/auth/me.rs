use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{
    responses::JsonResponse, routes::auth::AuthSession, services::entitlement::is_subscribed,
    state::AppState,
};

/// Profile of the signed-in caller plus their entitlement.
pub async fn handle_me(State(state): State<AppState>, session: AuthSession) -> Response {
    match state.users.find_user_by_id(session.user_id).await {
        Ok(Some(user)) => {
            let subscribed = is_subscribed(state.subscriptions.as_ref(), user.id).await;
            Json(json!({
                "success": true,
                "user": user,
                "isSubscribed": subscribed,
            }))
            .into_response()
        }
        Ok(None) => JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, user_id = %session.user_id, "failed to load profile");
            JsonResponse::server_error("Failed to load profile").into_response()
        }
    }
}
