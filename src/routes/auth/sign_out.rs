use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    responses::JsonResponse,
    routes::auth::cookies::without_session_cookies,
    state::AppState,
};

pub async fn handle_sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = without_session_cookies(jar, state.config.secure_cookies());

    (jar, JsonResponse::success("Signed out"))
}
