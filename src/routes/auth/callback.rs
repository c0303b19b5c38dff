use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    models::user::ProfileUpsert,
    responses::JsonResponse,
    routes::auth::cookies::{expired_cookie, with_session_cookies, CODE_VERIFIER_COOKIE},
    state::AppState,
    utils::origin::{request_origin, sanitize_redirect_path},
};

pub const MISSING_CODE_MESSAGE: &str = "Missing authentication code";
pub const MISSING_VERIFIER_MESSAGE: &str = "Sign-in session expired. Please try again.";
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub redirect_to: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Completes the OAuth code flow, stores the session cookies and refreshes
/// the profile row. Every failure ends on the sign-in page with a message.
pub async fn auth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let origin = request_origin(&headers, &state.config);

    if let Some(provider_error) = non_empty(&params.error) {
        let message = non_empty(&params.error_description).unwrap_or(provider_error);
        warn!(error = provider_error, %message, "auth provider returned an error");
        return JsonResponse::redirect_to_sign_in_with_error(&origin, message).into_response();
    }

    let Some(code) = non_empty(&params.code) else {
        warn!("auth callback without a code");
        return JsonResponse::redirect_to_sign_in_with_error(&origin, MISSING_CODE_MESSAGE)
            .into_response();
    };

    let Some(verifier) = jar
        .get(CODE_VERIFIER_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
    else {
        warn!("auth callback without a code verifier cookie");
        return JsonResponse::redirect_to_sign_in_with_error(&origin, MISSING_VERIFIER_MESSAGE)
            .into_response();
    };

    let session = match state.auth.exchange_code_for_session(code, &verifier).await {
        Ok(session) => session,
        Err(err) => {
            error!(?err, "session exchange failed");
            return JsonResponse::redirect_to_sign_in_with_error(&origin, &err.to_string())
                .into_response();
        }
    };

    let Some(user) = session.user.as_ref() else {
        error!("session exchange returned no user");
        return JsonResponse::redirect_to_sign_in_with_error(&origin, AUTH_FAILED_MESSAGE)
            .into_response();
    };

    info!(user_id = %user.id, "authentication successful");

    let profile = ProfileUpsert {
        id: user.id,
        email: user.email.clone(),
        full_name: user.display_name(),
    };
    if let Err(err) = state.users.upsert_profile(&profile).await {
        error!(?err, user_id = %user.id, "profile upsert failed; continuing sign-in");
    }

    let secure = state.config.secure_cookies();
    let jar = with_session_cookies(jar, &session, secure)
        .add(expired_cookie(CODE_VERIFIER_COOKIE, secure));

    let target = format!(
        "{}{}",
        origin,
        sanitize_redirect_path(params.redirect_to.as_deref())
    );
    (jar, Redirect::to(&target)).into_response()
}
