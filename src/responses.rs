use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

/// Success envelope used by the webhook endpoint and other acknowledgements.
#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

/// Error envelope shared by every API route: `{ "error": "..." }`.
#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl JsonResponse {
    pub fn success(msg: &str) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(JsonResponse {
                success: true,
                message: msg.to_string(),
            }),
        )
    }

    pub fn error(status: StatusCode, msg: &str) -> impl IntoResponse {
        (
            status,
            Json(ErrorBody {
                error: msg.to_string(),
            }),
        )
    }

    /// Error envelope carrying extra fields next to `error`, e.g.
    /// `isSubscribed` or `event_id`.
    pub fn error_with(status: StatusCode, msg: &str, extra: Value) -> impl IntoResponse {
        let mut body = json!({ "error": msg });
        if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), extra) {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }
        (status, Json(body))
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::NOT_FOUND, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::TOO_MANY_REQUESTS, msg)
    }

    /// Page flows never surface JSON errors; they bounce to the sign-in page
    /// with a human readable message instead.
    pub fn redirect_to_sign_in_with_error(origin: &str, msg: &str) -> impl IntoResponse {
        Self::redirect_with_message(origin, "/sign-in", MessageKind::Error, msg)
    }

    /// Redirects to `path` with the `type` and `message` query parameters the
    /// auth pages render as a banner.
    pub fn redirect_with_message(
        origin: &str,
        path: &str,
        kind: MessageKind,
        msg: &str,
    ) -> impl IntoResponse {
        let redirect_url = format!(
            "{}{}?type={}&message={}",
            origin.trim_end_matches('/'),
            path,
            kind.as_str(),
            urlencoding::encode(msg)
        );
        Redirect::to(&redirect_url).into_response()
    }
}
