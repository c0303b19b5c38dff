use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::warn;

use super::{
    prompt::build_prompt, GeneratedImage, GenerationError, GenerationRequest, ImageGenerator,
    GENERATED_MIME_TYPE,
};
use crate::config::GeminiSettings;

const GEMINI_MAX_RETRIES: usize = 3;
const GEMINI_BACKOFF_BASE_MS: u64 = 1000;

pub struct GeminiImageGenerator {
    client: Client,
    settings: GeminiSettings,
    max_retries: usize,
    initial_backoff: Duration,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

impl GenerateContentResponse {
    fn first_image(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
            .map(|inline| inline.data)
    }
}

impl GeminiImageGenerator {
    pub fn new(client: Client, settings: GeminiSettings) -> Self {
        Self {
            client,
            settings,
            max_retries: GEMINI_MAX_RETRIES,
            initial_backoff: Duration::from_millis(GEMINI_BACKOFF_BASE_MS),
        }
    }

    pub fn with_retry_policy(mut self, max_retries: usize, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.api_base, self.settings.model
        )
    }

    async fn call_once(&self, api_key: &str, payload: &Value) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| body.trim().to_string());
            return Err(GenerationError::Api { status, message });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
        parsed.first_image().ok_or(GenerationError::NoImage)
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedImage, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": build_prompt(&req.style, req.intensity) },
                    { "inlineData": { "mimeType": GENERATED_MIME_TYPE, "data": req.image } }
                ]
            }],
            "generationConfig": { "responseModalities": ["Text", "Image"] }
        });

        let mut retries = 0usize;
        let mut backoff = self.initial_backoff;

        loop {
            match self.call_once(api_key, &payload).await {
                Ok(image) => {
                    return Ok(GeneratedImage {
                        image,
                        mime_type: GENERATED_MIME_TYPE.to_string(),
                    })
                }
                Err(err) if err.is_overloaded() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        attempt = retries,
                        max_retries = self.max_retries,
                        delay_ms = backoff.as_millis() as u64,
                        "image model overloaded, retrying"
                    );
                    sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
