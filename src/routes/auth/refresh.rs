use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use crate::{
    responses::JsonResponse,
    routes::auth::cookies::{with_session_cookies, without_session_cookies, REFRESH_TOKEN_COOKIE},
    state::AppState,
};

/// Rotates the session stored in the cookies. A rejected refresh token clears
/// both cookies so the browser falls back to signing in again.
pub async fn handle_refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(refresh_token) = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
    else {
        return JsonResponse::unauthorized("Refresh token missing").into_response();
    };

    let secure = state.config.secure_cookies();
    match state.auth.refresh_session(&refresh_token).await {
        Ok(session) => {
            info!(
                user_id = ?session.user.as_ref().map(|u| u.id),
                "session refreshed"
            );
            let jar = with_session_cookies(jar, &session, secure);
            (jar, JsonResponse::success("Session refreshed")).into_response()
        }
        Err(err) => {
            warn!(?err, "session refresh rejected");
            let jar = without_session_cookies(jar, secure);
            (jar, JsonResponse::unauthorized("Session expired. Please sign in again."))
                .into_response()
        }
    }
}
