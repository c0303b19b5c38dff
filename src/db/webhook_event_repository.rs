use async_trait::async_trait;
use uuid::Uuid;

use crate::models::webhook_event::NewWebhookEvent;

#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn record_event(&self, event: &NewWebhookEvent) -> Result<Uuid, sqlx::Error>;
}
