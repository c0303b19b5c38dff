use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    responses::{JsonResponse, MessageKind},
    routes::auth::{
        callback::non_empty, cookies::with_session_cookies, signup::MISSING_CREDENTIALS_MESSAGE,
    },
    state::AppState,
    utils::origin::{request_origin, sanitize_redirect_path},
};

pub const SIGN_IN_PATH: &str = "/sign-in";

#[derive(Debug, Default, Deserialize)]
pub struct SignInForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub redirect_to: Option<String>,
}

pub async fn handle_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let origin = request_origin(&headers, &state.config);

    let (Some(email), Some(password)) = (
        non_empty(&form.email),
        form.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return JsonResponse::redirect_with_message(
            &origin,
            SIGN_IN_PATH,
            MessageKind::Error,
            MISSING_CREDENTIALS_MESSAGE,
        )
        .into_response();
    };

    let session = match state.auth.sign_in_with_password(email, password).await {
        Ok(session) => session,
        Err(err) => {
            warn!(?err, "password sign-in rejected");
            return JsonResponse::redirect_to_sign_in_with_error(&origin, &err.to_string())
                .into_response();
        }
    };

    info!(
        user_id = ?session.user.as_ref().map(|u| u.id),
        "password sign-in successful"
    );
    let jar = with_session_cookies(jar, &session, state.config.secure_cookies());
    let target = format!(
        "{}{}",
        origin,
        sanitize_redirect_path(form.redirect_to.as_deref())
    );
    (jar, Redirect::to(&target)).into_response()
}
