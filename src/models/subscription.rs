use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const SUBSCRIPTION_STATUS_ACTIVE: &str = "active";
pub const SUBSCRIPTION_STATUS_CANCELED: &str = "canceled";
pub const SUBSCRIPTION_STATUS_REVOKED: &str = "revoked";

/// Local mirror of one billing-provider subscription. Rows are keyed by
/// `polar_id` and are only ever status-transitioned, never deleted.
///
/// All instants are epoch milliseconds.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub polar_id: String,
    pub polar_price_id: Option<String>,
    pub user_id: Uuid,
    pub customer_id: Option<String>,
    pub status: String,
    pub currency: Option<String>,
    pub billing_interval: Option<String>,
    pub amount: Option<i64>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub canceled_at: Option<i64>,
    pub customer_cancellation_reason: Option<String>,
    pub customer_cancellation_comment: Option<String>,
    pub metadata: Value,
    pub custom_field_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SUBSCRIPTION_STATUS_ACTIVE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub polar_id: String,
    pub polar_price_id: Option<String>,
    pub user_id: Uuid,
    pub customer_id: Option<String>,
    pub status: String,
    pub currency: Option<String>,
    pub billing_interval: Option<String>,
    pub amount: Option<i64>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub canceled_at: Option<i64>,
    pub customer_cancellation_reason: Option<String>,
    pub customer_cancellation_comment: Option<String>,
    pub metadata: Value,
    pub custom_field_data: Value,
}

/// Fields refreshed by `subscription.updated`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRefresh {
    pub amount: Option<i64>,
    pub status: Option<String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub metadata: Value,
    pub custom_field_data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancellationDetails {
    pub canceled_at: Option<i64>,
    pub reason: Option<String>,
    pub comment: Option<String>,
}
