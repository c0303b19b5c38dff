use async_trait::async_trait;
use uuid::Uuid;

use crate::models::subscription::{
    CancellationDetails, NewSubscription, Subscription, SubscriptionRefresh,
};

/// Writes keyed by the provider subscription id return `false` when no row
/// matched so the caller can log the skip.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Returns `false` if a row with the same `polar_id` already existed.
    async fn insert_subscription(&self, new: &NewSubscription) -> Result<bool, sqlx::Error>;

    async fn refresh_subscription(
        &self,
        polar_id: &str,
        refresh: &SubscriptionRefresh,
    ) -> Result<bool, sqlx::Error>;

    async fn mark_active(&self, polar_id: &str, started_at: Option<i64>)
        -> Result<bool, sqlx::Error>;

    async fn mark_canceled(
        &self,
        polar_id: &str,
        details: &CancellationDetails,
    ) -> Result<bool, sqlx::Error>;

    async fn clear_cancellation(
        &self,
        polar_id: &str,
        status: Option<&str>,
    ) -> Result<bool, sqlx::Error>;

    async fn mark_revoked(&self, polar_id: &str, ended_at: Option<i64>)
        -> Result<bool, sqlx::Error>;

    /// Most recently started active row for the user, if any. Duplicate
    /// active rows are tolerated here rather than treated as an error.
    async fn find_active_for_user(&self, user_id: Uuid)
        -> Result<Option<Subscription>, sqlx::Error>;
}
