use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::responses::JsonResponse;

/// `Json<T>` whose rejections use the `{ "error": ... }` envelope instead of
/// axum's plain-text bodies.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

fn rejection_response(rejection: JsonRejection) -> Response {
    debug!(reason = %rejection.body_text(), "rejected request body");
    let (status, message) = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected a JSON request body",
        ),
        _ => (StatusCode::BAD_REQUEST, "Invalid request body"),
    };
    JsonResponse::error(status, message).into_response()
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}
