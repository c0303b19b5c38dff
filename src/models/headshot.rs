use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One saved output of the generation flow.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Headshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub style: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHeadshot {
    pub user_id: Uuid,
    pub image_url: String,
    pub style: String,
}

impl NewHeadshot {
    /// Generated images are stored inline as JPEG data URLs.
    pub fn from_base64(user_id: Uuid, image: &str, style: &str) -> Self {
        Self {
            user_id,
            image_url: format!("data:image/jpeg;base64,{image}"),
            style: style.to_string(),
        }
    }
}
