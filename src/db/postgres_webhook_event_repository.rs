use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::webhook_event_repository::WebhookEventRepository,
    models::webhook_event::NewWebhookEvent,
};

pub struct PostgresWebhookEventRepository {
    pub pool: PgPool,
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn record_event(&self, event: &NewWebhookEvent) -> Result<Uuid, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO webhook_events (event_type, polar_event_id, data)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&event.event_type)
        .bind(event.polar_event_id.as_deref())
        .bind(&event.data)
        .fetch_one(&self.pool)
        .await
    }
}
