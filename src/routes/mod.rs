pub mod auth;
pub mod billing;
pub mod generate;
pub mod headshots;
pub mod json_body;
pub mod usage;
pub mod webhook;

use std::convert::Infallible;

use axum::{
    extract::{DefaultBodyLimit, Request},
    response::{IntoResponse, Response},
    routing::{delete, get, post, Route},
    Router,
};
use tower::{Layer, Service};
use tower_http::trace::TraceLayer;

use crate::{responses::JsonResponse, state::AppState};

/// Uploads and generated results travel as base64 JSON, well past axum's
/// 2 MB default.
pub const IMAGE_BODY_LIMIT_BYTES: usize = 15 * 1024 * 1024;

pub async fn root() -> Response {
    JsonResponse::success("Hello from Headshot Maker!").into_response()
}

/// Everything browsers call. The rate limiter is layered onto this group.
pub fn throttled_routes() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/google", get(auth::google_login))
        .route("/me", get(auth::handle_me))
        .route("/sign-out", post(auth::handle_sign_out))
        .route("/refresh", post(auth::handle_refresh))
        .route("/sign-up", post(auth::handle_signup))
        .route("/sign-in", post(auth::handle_login))
        .route("/forgot-password", post(auth::handle_forgot_password))
        .route("/reset-password", post(auth::handle_reset_password));

    Router::new()
        .route("/", get(root))
        .route("/auth/callback", get(auth::auth_callback))
        .nest("/api/auth", auth_routes)
        .route("/api/create-checkout", post(billing::create_checkout))
        .route("/api/check-subscription", post(billing::check_subscription))
        .route("/api/manage-subscription", post(billing::manage_subscription))
        .route(
            "/api/gemini",
            post(generate::generate_headshot).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT_BYTES)),
        )
        .route("/api/usage", get(usage::get_usage))
        .route(
            "/api/headshots",
            get(headshots::list_headshots)
                .post(headshots::save_headshot)
                .layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT_BYTES)),
        )
        .route("/api/headshots/{id}", delete(headshots::delete_headshot))
}

/// Provider callbacks; never throttled so redeliveries always land.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/api/polar/webhook", post(webhook::polar_webhook))
}

/// The whole application. `throttle` wraps only the browser-facing routes.
pub fn app<L>(state: AppState, throttle: L) -> Router
where
    L: Layer<Route> + Clone + Send + Sync + 'static,
    L::Service: Service<Request> + Clone + Send + Sync + 'static,
    <L::Service as Service<Request>>::Response: IntoResponse + 'static,
    <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
    <L::Service as Service<Request>>::Future: Send + 'static,
{
    throttled_routes()
        .layer(throttle)
        .merge(webhook_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
