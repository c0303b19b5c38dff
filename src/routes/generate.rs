use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    responses::JsonResponse,
    routes::json_body::JsonBody,
    services::generation::{strip_data_url, GenerationRequest, DEFAULT_INTENSITY},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateBody {
    pub image: Option<String>,
    pub style: Option<String>,
    pub intensity: Option<f64>,
}

/// Restyles an uploaded portrait. Quota is advisory and not checked here.
pub async fn generate_headshot(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenerateBody>,
) -> Response {
    let image = body.image.as_deref().map(strip_data_url).unwrap_or_default();
    if image.is_empty() {
        return JsonResponse::bad_request("No image provided").into_response();
    }

    let request = GenerationRequest {
        image: image.to_string(),
        style: body.style.unwrap_or_default(),
        intensity: body.intensity.unwrap_or(DEFAULT_INTENSITY),
    };
    info!(style = %request.style, intensity = request.intensity, "generating headshot");

    match state.generator.generate(&request).await {
        Ok(generated) => Json(generated).into_response(),
        Err(err) => {
            error!(?err, style = %request.style, "headshot generation failed");
            JsonResponse::server_error(&err.to_string()).into_response()
        }
    }
}
