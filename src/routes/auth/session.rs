use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    responses::JsonResponse, routes::auth::cookies::ACCESS_TOKEN_COOKIE, state::AppState,
    utils::jwt::decode_access_token,
};

/// Signed-in caller, recognised from the access-token cookie or a bearer header.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// The verified token, for calls made on the user's behalf.
    pub access_token: String,
}

fn access_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `Ok(None)` when there is no usable token; `Err` only for a server-side
/// misconfiguration.
fn resolve(parts: &Parts, state: &AppState) -> Result<Option<AuthSession>, Response> {
    let Some(token) = access_token(parts) else {
        return Ok(None);
    };
    let Some(secret) = state.config.supabase.jwt_secret.as_deref() else {
        error!("SUPABASE_JWT_SECRET is not set; cannot verify sessions");
        return Err(JsonResponse::server_error("Authentication is not configured").into_response());
    };

    let claims = match decode_access_token(&token, secret) {
        Ok(data) => data.claims,
        Err(err) => {
            debug!(?err, "rejected access token");
            return Ok(None);
        }
    };

    match Uuid::parse_str(&claims.sub) {
        Ok(user_id) => Ok(Some(AuthSession {
            user_id,
            email: claims.email,
            access_token: token,
        })),
        Err(_) => {
            debug!(sub = %claims.sub, "access token subject is not a UUID");
            Ok(None)
        }
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)?
            .ok_or_else(|| JsonResponse::unauthorized("User not authenticated").into_response())
    }
}

impl OptionalFromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        resolve(parts, state)
    }
}
