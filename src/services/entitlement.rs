use tracing::{error, info};
use uuid::Uuid;

use crate::db::subscription_repository::SubscriptionRepository;

/// Whether `user_id` holds an active paid subscription.
///
/// Fails closed: a lookup error is logged and treated as "not subscribed".
/// Nothing is cached.
pub async fn is_subscribed(repo: &dyn SubscriptionRepository, user_id: Uuid) -> bool {
    match repo.find_active_for_user(user_id).await {
        Ok(Some(subscription)) => {
            info!(%user_id, polar_id = %subscription.polar_id, "active subscription found");
            true
        }
        Ok(None) => false,
        Err(err) => {
            error!(?err, %user_id, "subscription lookup failed; treating user as unsubscribed");
            false
        }
    }
}
