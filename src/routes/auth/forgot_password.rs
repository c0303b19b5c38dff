use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use time::Duration as TimeDuration;
use tracing::{info, warn};

use crate::{
    responses::{JsonResponse, MessageKind},
    routes::auth::{
        callback::non_empty,
        cookies::{http_only_cookie, CODE_VERIFIER_COOKIE, CODE_VERIFIER_TTL_MINUTES},
        reset_password::RESET_PASSWORD_PATH,
    },
    state::AppState,
    utils::{
        origin::{request_origin, sanitize_redirect_path},
        pkce::{code_challenge, generate_code_verifier},
    },
};

pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: Option<String>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Sends a recovery mail. The link is a PKCE sign-in whose verifier lives in
/// this browser, so the callback drops the user on the reset-password page
/// already signed in.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let origin = request_origin(&headers, &state.config);
    let back = |kind, message: &str| {
        JsonResponse::redirect_with_message(&origin, FORGOT_PASSWORD_PATH, kind, message)
            .into_response()
    };

    let Some(email) = non_empty(&form.email) else {
        return back(MessageKind::Error, "Email is required");
    };

    let verifier = generate_code_verifier();
    let recovery_landing = format!(
        "{}/auth/callback?redirect_to={}",
        state.config.site_url,
        urlencoding::encode(RESET_PASSWORD_PATH)
    );
    if let Err(err) = state
        .auth
        .send_password_reset(email, &recovery_landing, &code_challenge(&verifier))
        .await
    {
        warn!(?err, "password recovery request failed");
        return back(MessageKind::Error, "Could not reset password");
    }

    info!("password recovery mail sent");
    let jar = jar.add(http_only_cookie(
        CODE_VERIFIER_COOKIE,
        verifier,
        TimeDuration::minutes(CODE_VERIFIER_TTL_MINUTES),
        state.config.secure_cookies(),
    ));

    match non_empty(&form.callback_url) {
        Some(callback) => {
            let target = format!("{}{}", origin, sanitize_redirect_path(Some(callback)));
            (jar, Redirect::to(&target)).into_response()
        }
        None => (
            jar,
            back(
                MessageKind::Success,
                "Check your email for a link to reset your password.",
            ),
        )
            .into_response(),
    }
}
