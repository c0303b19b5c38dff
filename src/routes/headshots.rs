use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    models::headshot::NewHeadshot,
    responses::JsonResponse,
    routes::{auth::AuthSession, json_body::JsonBody},
    services::generation::strip_data_url,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct SaveHeadshotBody {
    pub image: Option<String>,
    pub style: Option<String>,
}

pub async fn list_headshots(State(state): State<AppState>, session: AuthSession) -> Response {
    match state.headshots.list_for_user(session.user_id).await {
        Ok(headshots) => Json(json!({ "headshots": headshots })).into_response(),
        Err(err) => {
            error!(?err, user_id = %session.user_id, "failed to list headshots");
            JsonResponse::server_error("Failed to load headshots").into_response()
        }
    }
}

pub async fn save_headshot(
    State(state): State<AppState>,
    session: AuthSession,
    JsonBody(body): JsonBody<SaveHeadshotBody>,
) -> Response {
    let image = body.image.as_deref().map(strip_data_url).unwrap_or_default();
    if image.is_empty() {
        return JsonResponse::bad_request("No image provided").into_response();
    }
    let style = body.style.unwrap_or_default();

    let new = NewHeadshot::from_base64(session.user_id, image, &style);
    match state.headshots.insert_headshot(&new).await {
        Ok(headshot) => {
            info!(user_id = %session.user_id, headshot_id = %headshot.id, %style, "headshot saved");
            (StatusCode::CREATED, Json(headshot)).into_response()
        }
        Err(err) => {
            error!(?err, user_id = %session.user_id, "failed to save headshot");
            JsonResponse::server_error("Failed to save headshot").into_response()
        }
    }
}

pub async fn delete_headshot(
    State(state): State<AppState>,
    session: AuthSession,
    Path(headshot_id): Path<Uuid>,
) -> Response {
    match state
        .headshots
        .delete_for_user(headshot_id, session.user_id)
        .await
    {
        Ok(true) => JsonResponse::success("Headshot deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Headshot not found").into_response(),
        Err(err) => {
            error!(?err, %headshot_id, "failed to delete headshot");
            JsonResponse::server_error("Failed to delete headshot").into_response()
        }
    }
}
