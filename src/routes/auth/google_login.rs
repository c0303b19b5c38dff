use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use time::Duration as TimeDuration;
use tracing::{error, info};

use crate::{
    responses::JsonResponse,
    routes::auth::cookies::{http_only_cookie, CODE_VERIFIER_COOKIE, CODE_VERIFIER_TTL_MINUTES},
    state::AppState,
    utils::{
        origin::{request_origin, sanitize_redirect_path},
        pkce::{code_challenge, generate_code_verifier},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct GoogleLoginParams {
    pub redirect_to: Option<String>,
}

/// Starts Google sign-in through the auth provider using PKCE.
pub async fn google_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(params): Query<GoogleLoginParams>,
) -> Response {
    let redirect_path = sanitize_redirect_path(params.redirect_to.as_deref());
    let callback_url = format!(
        "{}/auth/callback?redirect_to={}",
        state.config.site_url,
        urlencoding::encode(&redirect_path)
    );

    let verifier = generate_code_verifier();
    let challenge = code_challenge(&verifier);

    let authorize_url = match state.auth.authorize_url(&callback_url, &challenge) {
        Ok(url) => url,
        Err(err) => {
            error!(?err, "cannot start Google sign-in");
            let origin = request_origin(&headers, &state.config);
            return JsonResponse::redirect_to_sign_in_with_error(&origin, &err.to_string())
                .into_response();
        }
    };

    info!(%redirect_path, "redirecting to Google sign-in");
    let verifier_cookie = http_only_cookie(
        CODE_VERIFIER_COOKIE,
        verifier,
        TimeDuration::minutes(CODE_VERIFIER_TTL_MINUTES),
        state.config.secure_cookies(),
    );

    (jar.add(verifier_cookie), Redirect::to(&authorize_url)).into_response()
}
