use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    GeneratedImage, GenerationError, GenerationRequest, ImageGenerator, GENERATED_MIME_TYPE,
};

#[derive(Default)]
pub struct MockImageGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub missing_api_key: bool,
    pub no_image: bool,
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedImage, GenerationError> {
        self.requests.lock().unwrap().push(req.clone());
        if self.missing_api_key {
            return Err(GenerationError::MissingApiKey);
        }
        if self.no_image {
            return Err(GenerationError::NoImage);
        }
        Ok(GeneratedImage {
            image: format!("styled:{}", req.image),
            mime_type: GENERATED_MIME_TYPE.to_string(),
        })
    }
}
