use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    models::user::ProfileUpsert,
    responses::{JsonResponse, MessageKind},
    routes::auth::callback::non_empty,
    services::auth::service::PasswordSignUp,
    state::AppState,
    utils::origin::request_origin,
};

pub const SIGN_UP_PATH: &str = "/sign-up";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required";
pub const SIGN_UP_SUCCESS_MESSAGE: &str =
    "Thanks for signing up! Please check your email for a verification link.";

#[derive(Debug, Default, Deserialize)]
pub struct SignUpForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

/// Email/password registration. The confirmation mail brings the user back
/// through `/auth/callback`.
pub async fn handle_signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SignUpForm>,
) -> Response {
    let origin = request_origin(&headers, &state.config);
    let back = |kind, message: &str| {
        JsonResponse::redirect_with_message(&origin, SIGN_UP_PATH, kind, message).into_response()
    };

    let (Some(email), Some(password)) = (non_empty(&form.email), form.password.as_deref()) else {
        return back(MessageKind::Error, MISSING_CREDENTIALS_MESSAGE);
    };
    if password.is_empty() {
        return back(MessageKind::Error, MISSING_CREDENTIALS_MESSAGE);
    }

    let signup = PasswordSignUp {
        email: email.to_string(),
        password: password.to_string(),
        full_name: non_empty(&form.full_name).map(str::to_string),
        redirect_to: format!("{origin}/auth/callback"),
    };
    let user = match state.auth.sign_up(&signup).await {
        Ok(user) => user,
        Err(err) => {
            warn!(?err, "sign up rejected");
            return back(MessageKind::Error, &err.to_string());
        }
    };

    if let Some(user) = user {
        info!(user_id = %user.id, "account created");
        let profile = ProfileUpsert {
            id: user.id,
            email: Some(signup.email.clone()),
            full_name: signup.full_name.clone(),
        };
        if let Err(err) = state.users.upsert_profile(&profile).await {
            error!(?err, user_id = %user.id, "profile insert after sign up failed");
        }
    }

    back(MessageKind::Success, SIGN_UP_SUCCESS_MESSAGE)
}
