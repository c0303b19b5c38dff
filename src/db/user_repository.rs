use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{ProfileUpsert, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the profile or refreshes email/name on conflict.
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<(), sqlx::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
}
