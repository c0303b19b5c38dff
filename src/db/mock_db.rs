use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::db::{
    headshot_repository::HeadshotRepository, subscription_repository::SubscriptionRepository,
    user_repository::UserRepository, webhook_event_repository::WebhookEventRepository,
};
use crate::models::{
    headshot::{Headshot, NewHeadshot},
    subscription::{
        CancellationDetails, NewSubscription, Subscription, SubscriptionRefresh,
        SUBSCRIPTION_STATUS_ACTIVE, SUBSCRIPTION_STATUS_CANCELED, SUBSCRIPTION_STATUS_REVOKED,
    },
    user::{ProfileUpsert, User},
    webhook_event::{NewWebhookEvent, WebhookEvent},
};

/// In-memory stand-in for every repository. `should_fail` turns all calls
/// into database errors; the narrower flags fail a single concern.
#[derive(Default)]
pub struct MockDb {
    pub should_fail: bool,
    pub fail_profile_upsert: bool,
    pub fail_subscription_reads: bool,
    pub users: Mutex<Vec<User>>,
    pub subscriptions: Mutex<Vec<Subscription>>,
    pub webhook_events: Mutex<Vec<WebhookEvent>>,
    pub headshots: Mutex<Vec<Headshot>>,
    pub upsert_profile_calls: Mutex<usize>,
}

fn mock_failure() -> sqlx::Error {
    sqlx::Error::Protocol("Mock DB failure".into())
}

impl MockDb {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn with_subscription(self, subscription: Subscription) -> Self {
        self.subscriptions.lock().unwrap().push(subscription);
        self
    }

    pub fn with_headshots(self, user_id: Uuid, count: usize) -> Self {
        {
            let mut rows = self.headshots.lock().unwrap();
            for i in 0..count {
                rows.push(Headshot {
                    id: Uuid::new_v4(),
                    user_id,
                    image_url: format!("data:image/jpeg;base64,seed{i}"),
                    style: "corporate".into(),
                    created_at: Utc::now() - chrono::Duration::minutes(i as i64),
                });
            }
        }
        self
    }

    pub fn subscription(&self, polar_id: &str) -> Option<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.polar_id == polar_id)
            .cloned()
    }

    fn update_subscription<F>(&self, polar_id: &str, apply: F) -> Result<bool, sqlx::Error>
    where
        F: FnOnce(&mut Subscription),
    {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut rows = self.subscriptions.lock().unwrap();
        match rows.iter_mut().find(|s| s.polar_id == polar_id) {
            Some(row) => {
                apply(row);
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A fully populated active subscription for `user_id`.
pub fn active_subscription(polar_id: &str, user_id: Uuid) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: Uuid::new_v4(),
        polar_id: polar_id.to_string(),
        polar_price_id: Some("price_123".into()),
        user_id,
        customer_id: Some("cus_123".into()),
        status: SUBSCRIPTION_STATUS_ACTIVE.into(),
        currency: Some("usd".into()),
        billing_interval: Some("month".into()),
        amount: Some(999),
        current_period_start: Some(1_700_000_000_000),
        current_period_end: Some(1_702_592_000_000),
        cancel_at_period_end: false,
        started_at: Some(1_700_000_000_000),
        ended_at: None,
        canceled_at: None,
        customer_cancellation_reason: None,
        customer_cancellation_comment: None,
        metadata: serde_json::json!({ "userId": user_id.to_string() }),
        custom_field_data: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<(), sqlx::Error> {
        *self.upsert_profile_calls.lock().unwrap() += 1;
        if self.should_fail || self.fail_profile_upsert {
            return Err(mock_failure());
        }
        let mut users = self.users.lock().unwrap();
        let now = Utc::now();
        match users.iter_mut().find(|u| u.id == profile.id) {
            Some(user) => {
                user.email = profile.email.clone();
                if profile.full_name.is_some() {
                    user.name = profile.full_name.clone();
                    user.full_name = profile.full_name.clone();
                }
                user.updated_at = now;
            }
            None => users.push(User {
                id: profile.id,
                email: profile.email.clone(),
                name: profile.full_name.clone(),
                full_name: profile.full_name.clone(),
                created_at: now,
                updated_at: now,
            }),
        }
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for MockDb {
    async fn insert_subscription(&self, new: &NewSubscription) -> Result<bool, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut rows = self.subscriptions.lock().unwrap();
        if rows.iter().any(|s| s.polar_id == new.polar_id) {
            return Ok(false);
        }
        let now = Utc::now();
        rows.push(Subscription {
            id: Uuid::new_v4(),
            polar_id: new.polar_id.clone(),
            polar_price_id: new.polar_price_id.clone(),
            user_id: new.user_id,
            customer_id: new.customer_id.clone(),
            status: new.status.clone(),
            currency: new.currency.clone(),
            billing_interval: new.billing_interval.clone(),
            amount: new.amount,
            current_period_start: new.current_period_start,
            current_period_end: new.current_period_end,
            cancel_at_period_end: new.cancel_at_period_end,
            started_at: new.started_at,
            ended_at: new.ended_at,
            canceled_at: new.canceled_at,
            customer_cancellation_reason: new.customer_cancellation_reason.clone(),
            customer_cancellation_comment: new.customer_cancellation_comment.clone(),
            metadata: new.metadata.clone(),
            custom_field_data: new.custom_field_data.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(true)
    }

    async fn refresh_subscription(
        &self,
        polar_id: &str,
        refresh: &SubscriptionRefresh,
    ) -> Result<bool, sqlx::Error> {
        self.update_subscription(polar_id, |row| {
            row.amount = refresh.amount;
            if let Some(status) = &refresh.status {
                row.status = status.clone();
            }
            row.current_period_start = refresh.current_period_start;
            row.current_period_end = refresh.current_period_end;
            row.cancel_at_period_end = refresh.cancel_at_period_end;
            row.metadata = refresh.metadata.clone();
            row.custom_field_data = refresh.custom_field_data.clone();
        })
    }

    async fn mark_active(
        &self,
        polar_id: &str,
        started_at: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        self.update_subscription(polar_id, |row| {
            row.status = SUBSCRIPTION_STATUS_ACTIVE.into();
            if started_at.is_some() {
                row.started_at = started_at;
            }
        })
    }

    async fn mark_canceled(
        &self,
        polar_id: &str,
        details: &CancellationDetails,
    ) -> Result<bool, sqlx::Error> {
        self.update_subscription(polar_id, |row| {
            row.status = SUBSCRIPTION_STATUS_CANCELED.into();
            row.canceled_at = details.canceled_at;
            row.customer_cancellation_reason = details.reason.clone();
            row.customer_cancellation_comment = details.comment.clone();
        })
    }

    async fn clear_cancellation(
        &self,
        polar_id: &str,
        status: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        self.update_subscription(polar_id, |row| {
            if let Some(status) = status {
                row.status = status.to_string();
            }
            row.canceled_at = None;
            row.customer_cancellation_reason = None;
            row.customer_cancellation_comment = None;
            row.cancel_at_period_end = false;
        })
    }

    async fn mark_revoked(
        &self,
        polar_id: &str,
        ended_at: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        self.update_subscription(polar_id, |row| {
            row.status = SUBSCRIPTION_STATUS_REVOKED.into();
            row.ended_at = ended_at;
        })
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        if self.should_fail || self.fail_subscription_reads {
            return Err(mock_failure());
        }
        let rows = self.subscriptions.lock().unwrap();
        let mut active: Vec<&Subscription> = rows
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active())
            .collect();
        active.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(active.first().map(|s| (*s).clone()))
    }
}

#[async_trait]
impl WebhookEventRepository for MockDb {
    async fn record_event(&self, event: &NewWebhookEvent) -> Result<Uuid, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let id = Uuid::new_v4();
        self.webhook_events.lock().unwrap().push(WebhookEvent {
            id,
            event_type: event.event_type.clone(),
            polar_event_id: event.polar_event_id.clone(),
            data: event.data.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

#[async_trait]
impl HeadshotRepository for MockDb {
    async fn insert_headshot(&self, new: &NewHeadshot) -> Result<Headshot, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let headshot = Headshot {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            image_url: new.image_url.clone(),
            style: new.style.clone(),
            created_at: Utc::now(),
        };
        self.headshots.lock().unwrap().push(headshot.clone());
        Ok(headshot)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Headshot>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut rows: Vec<Headshot> = self
            .headshots
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self
            .headshots
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.user_id == user_id)
            .count() as i64)
    }

    async fn delete_for_user(&self, headshot_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut rows = self.headshots.lock().unwrap();
        let before = rows.len();
        rows.retain(|h| !(h.id == headshot_id && h.user_id == user_id));
        Ok(rows.len() != before)
    }
}
