use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    responses::{JsonResponse, MessageKind},
    routes::auth::AuthSession,
    state::AppState,
    utils::origin::request_origin,
};

pub const RESET_PASSWORD_PATH: &str = "/dashboard/reset-password";

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordForm {
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
}

/// Sets a new password for the signed-in user, normally right after a
/// recovery link signed them in.
pub async fn handle_reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Option<AuthSession>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let origin = request_origin(&headers, &state.config);
    let back = |kind, message: &str| {
        JsonResponse::redirect_with_message(&origin, RESET_PASSWORD_PATH, kind, message)
            .into_response()
    };

    let Some(session) = session else {
        return JsonResponse::redirect_to_sign_in_with_error(&origin, "User not authenticated")
            .into_response();
    };

    let password = form.password.as_deref().unwrap_or_default();
    let confirm = form.confirm_password.as_deref().unwrap_or_default();
    if password.is_empty() || confirm.is_empty() {
        return back(
            MessageKind::Error,
            "Password and confirm password are required",
        );
    }
    if password != confirm {
        return back(MessageKind::Error, "Passwords do not match");
    }

    if let Err(err) = state
        .auth
        .update_password(&session.access_token, password)
        .await
    {
        warn!(?err, user_id = %session.user_id, "password update rejected");
        return back(MessageKind::Error, "Password update failed");
    }

    info!(user_id = %session.user_id, "password updated");
    back(MessageKind::Success, "Password updated")
}
