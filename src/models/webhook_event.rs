use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit row for every inbound billing delivery.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: Uuid,
    pub event_type: String,
    pub polar_event_id: Option<String>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWebhookEvent {
    pub event_type: String,
    pub polar_event_id: Option<String>,
    pub data: Value,
}
