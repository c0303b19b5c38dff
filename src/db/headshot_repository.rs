use async_trait::async_trait;
use uuid::Uuid;

use crate::models::headshot::{Headshot, NewHeadshot};

#[async_trait]
pub trait HeadshotRepository: Send + Sync {
    async fn insert_headshot(&self, new: &NewHeadshot) -> Result<Headshot, sqlx::Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Headshot>, sqlx::Error>;
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;
    /// Deletes only when `user_id` owns the record.
    async fn delete_for_user(&self, headshot_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>;
}
