pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod prompt;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub const GENERATED_MIME_TYPE: &str = "image/jpeg";
pub const DEFAULT_INTENSITY: f64 = 50.0;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("Image model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status} {message}")]
    Api { status: StatusCode, message: String },
    #[error("Failed to generate image")]
    NoImage,
    #[error("Image model returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Only upstream overload is worth another attempt.
    pub fn is_overloaded(&self) -> bool {
        match self {
            GenerationError::Api { status, message } => {
                *status == StatusCode::SERVICE_UNAVAILABLE
                    || message.to_ascii_lowercase().contains("overloaded")
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Base64 JPEG without a data-URL prefix.
    pub image: String,
    pub style: String,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedImage {
    pub image: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Accepts either raw base64 or a `data:...;base64,` URL and returns the
/// bare payload.
pub fn strip_data_url(image: &str) -> &str {
    let trimmed = image.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(""),
        None => trimmed,
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedImage, GenerationError>;
}
