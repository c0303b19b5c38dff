//! Applies billing-provider lifecycle events to the local subscription ledger.
//!
//! Every delivery is written to the audit log before it is reconciled. Each
//! delivery causes at most one ledger write, and nothing is retried here: the
//! provider's redelivery is the only recovery path.
pub mod event;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    db::{
        subscription_repository::SubscriptionRepository,
        webhook_event_repository::WebhookEventRepository,
    },
    models::webhook_event::NewWebhookEvent,
};
use event::{BillingEvent, WebhookEnvelope};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid webhook body: {0}")]
    InvalidJson(String),
    #[error("Invalid {event_type} payload: {reason}")]
    InvalidPayload { event_type: String, reason: String },
    #[error("Subscription {0} has no metadata.userId")]
    MissingUserId(String),
    #[error("metadata.userId is not a valid UUID: {0}")]
    InvalidUserId(String),
    #[error("Invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What a single delivery did to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted,
    /// `subscription.created` for a row we already hold.
    AlreadyRecorded,
    Updated,
    /// Update-class event with no matching row.
    Skipped,
    /// Acknowledged without touching the ledger.
    Logged,
}

#[derive(Debug)]
pub struct WebhookReceipt {
    pub event_type: String,
    pub event_id: Option<Uuid>,
    pub outcome: ReconcileOutcome,
}

/// Reconciliation failure with the audit row id, if one was written.
#[derive(Debug)]
pub struct WebhookFailure {
    pub error: WebhookError,
    pub event_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct WebhookReconciler {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub events: Arc<dyn WebhookEventRepository>,
}

impl WebhookReconciler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        events: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            subscriptions,
            events,
        }
    }

    /// Parses, audits and reconciles one raw delivery.
    pub async fn handle_delivery(&self, body: &[u8]) -> Result<WebhookReceipt, WebhookFailure> {
        let envelope: WebhookEnvelope =
            serde_json::from_slice(body).map_err(|err| WebhookFailure {
                error: WebhookError::InvalidJson(err.to_string()),
                event_id: None,
            })?;

        let data_id = envelope.data_id().unwrap_or_default();
        let user_id = envelope.data["metadata"]["userId"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        info!(
            event_type = %envelope.event_type,
            %data_id,
            %user_id,
            "processing billing webhook"
        );

        let event_id = self.audit(&envelope).await;
        let fail = |error: WebhookError| WebhookFailure { error, event_id };

        let event = BillingEvent::from_envelope(&envelope).map_err(fail)?;
        let outcome = self.reconcile(event).await.map_err(fail)?;

        Ok(WebhookReceipt {
            event_type: envelope.event_type,
            event_id,
            outcome,
        })
    }

    /// Audit failures are logged and never block reconciliation.
    async fn audit(&self, envelope: &WebhookEnvelope) -> Option<Uuid> {
        let record = NewWebhookEvent {
            event_type: envelope.event_type.clone(),
            polar_event_id: envelope.data_id(),
            data: if envelope.data.is_null() {
                Value::Object(Default::default())
            } else {
                envelope.data.clone()
            },
        };

        match self.events.record_event(&record).await {
            Ok(id) => Some(id),
            Err(err) => {
                error!(?err, event_type = %envelope.event_type, "failed to store webhook event");
                None
            }
        }
    }

    pub async fn reconcile(&self, event: BillingEvent) -> Result<ReconcileOutcome, WebhookError> {
        let repo = &self.subscriptions;

        let (polar_id, matched) = match event {
            BillingEvent::SubscriptionCreated(payload) => {
                let new = payload.to_new_subscription()?;
                if repo.insert_subscription(&new).await? {
                    info!(polar_id = %new.polar_id, user_id = %new.user_id, status = %new.status, "subscription recorded");
                    return Ok(ReconcileOutcome::Inserted);
                }
                info!(polar_id = %new.polar_id, "subscription already recorded, ignoring redelivery");
                return Ok(ReconcileOutcome::AlreadyRecorded);
            }
            BillingEvent::SubscriptionUpdated(payload) => {
                let refresh = payload.to_refresh()?;
                let matched = repo.refresh_subscription(&payload.id, &refresh).await?;
                (payload.id, matched)
            }
            BillingEvent::SubscriptionActive(payload) => {
                let started_at = payload.started_at_millis()?;
                let matched = repo.mark_active(&payload.id, started_at).await?;
                (payload.id, matched)
            }
            BillingEvent::SubscriptionCanceled(payload) => {
                let details = payload.to_cancellation()?;
                let matched = repo.mark_canceled(&payload.id, &details).await?;
                (payload.id, matched)
            }
            BillingEvent::SubscriptionUncanceled(payload) => {
                let status = payload
                    .status
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty());
                let matched = repo.clear_cancellation(&payload.id, status).await?;
                (payload.id, matched)
            }
            BillingEvent::SubscriptionRevoked(payload) => {
                let ended_at = payload.ended_at_millis()?;
                let matched = repo.mark_revoked(&payload.id, ended_at).await?;
                (payload.id, matched)
            }
            BillingEvent::OrderCreated { order_id } => {
                let order_id = order_id.unwrap_or_default();
                info!(%order_id, "order created; settled through subscription events");
                return Ok(ReconcileOutcome::Logged);
            }
            BillingEvent::Unknown { event_type } => {
                info!(%event_type, "unhandled billing event type");
                return Ok(ReconcileOutcome::Logged);
            }
        };

        if matched {
            info!(%polar_id, "subscription updated");
            Ok(ReconcileOutcome::Updated)
        } else {
            warn!(%polar_id, "no subscription matches webhook event, skipping");
            Ok(ReconcileOutcome::Skipped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock_db::{active_subscription, MockDb};
    use crate::models::subscription::{
        SUBSCRIPTION_STATUS_ACTIVE, SUBSCRIPTION_STATUS_CANCELED, SUBSCRIPTION_STATUS_REVOKED,
    };
    use serde_json::json;

    fn reconciler(db: Arc<MockDb>) -> WebhookReconciler {
        WebhookReconciler::new(db.clone(), db)
    }

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn created(polar_id: &str, user_id: Uuid, status: &str) -> Vec<u8> {
        body(json!({
            "type": "subscription.created",
            "data": {
                "id": polar_id,
                "status": status,
                "price_id": "price_1",
                "currency": "usd",
                "recurring_interval": "month",
                "amount": 999,
                "current_period_start": "2024-01-01T00:00:00Z",
                "current_period_end": "2024-02-01T00:00:00Z",
                "cancel_at_period_end": false,
                "started_at": "2024-01-01T00:00:00Z",
                "ended_at": null,
                "canceled_at": null,
                "customer_id": "cus_1",
                "metadata": { "userId": user_id.to_string() }
            }
        }))
    }

    fn updated(polar_id: &str, status: &str, amount: i64) -> Vec<u8> {
        body(json!({
            "type": "subscription.updated",
            "data": {
                "id": polar_id,
                "status": status,
                "amount": amount,
                "current_period_start": "2024-02-01T00:00:00Z",
                "current_period_end": "2024-03-01T00:00:00Z",
                "cancel_at_period_end": true,
                "metadata": { "userId": Uuid::new_v4().to_string() }
            }
        }))
    }

    #[tokio::test]
    async fn created_then_updates_keeps_last_status_and_owner() {
        let db = Arc::new(MockDb::default());
        let reconciler = reconciler(db.clone());
        let owner = Uuid::new_v4();

        let receipt = reconciler
            .handle_delivery(&created("sub_1", owner, "incomplete"))
            .await
            .unwrap();
        assert_eq!(receipt.outcome, ReconcileOutcome::Inserted);

        for (status, amount) in [("active", 999), ("past_due", 999), ("active", 1999)] {
            let receipt = reconciler
                .handle_delivery(&updated("sub_1", status, amount))
                .await
                .unwrap();
            assert_eq!(receipt.outcome, ReconcileOutcome::Updated);
        }

        let row = db.subscription("sub_1").unwrap();
        assert_eq!(row.status, "active");
        assert_eq!(row.amount, Some(1999));
        assert_eq!(row.user_id, owner);
        assert!(row.cancel_at_period_end);
        assert_eq!(row.current_period_end, Some(1_709_251_200_000));
    }

    #[tokio::test]
    async fn created_converts_timestamps_and_fields() {
        let db = Arc::new(MockDb::default());
        let owner = Uuid::new_v4();
        reconciler(db.clone())
            .handle_delivery(&created("sub_1", owner, "active"))
            .await
            .unwrap();

        let row = db.subscription("sub_1").unwrap();
        assert_eq!(row.user_id, owner);
        assert_eq!(row.status, SUBSCRIPTION_STATUS_ACTIVE);
        assert_eq!(row.started_at, Some(1_704_067_200_000));
        assert_eq!(row.current_period_start, Some(1_704_067_200_000));
        assert_eq!(row.ended_at, None);
        assert_eq!(row.billing_interval.as_deref(), Some("month"));
        assert_eq!(row.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(row.metadata["userId"], owner.to_string());
    }

    #[tokio::test]
    async fn redelivered_created_is_not_an_error() {
        let db = Arc::new(MockDb::default());
        let reconciler = reconciler(db.clone());
        let owner = Uuid::new_v4();

        reconciler
            .handle_delivery(&created("sub_1", owner, "active"))
            .await
            .unwrap();
        let receipt = reconciler
            .handle_delivery(&created("sub_1", Uuid::new_v4(), "incomplete"))
            .await
            .unwrap();

        assert_eq!(receipt.outcome, ReconcileOutcome::AlreadyRecorded);
        assert_eq!(db.subscriptions.lock().unwrap().len(), 1);
        assert_eq!(db.subscription("sub_1").unwrap().user_id, owner);
    }

    #[tokio::test]
    async fn active_redelivery_is_idempotent() {
        let user_id = Uuid::new_v4();
        let mut seeded = active_subscription("sub_1", user_id);
        seeded.status = "incomplete".into();
        let db = Arc::new(MockDb::default().with_subscription(seeded));
        let reconciler = reconciler(db.clone());
        let delivery = body(json!({
            "type": "subscription.active",
            "data": { "id": "sub_1", "status": "active", "started_at": "2024-03-01T00:00:00Z" }
        }));

        reconciler.handle_delivery(&delivery).await.unwrap();
        let once = db.subscription("sub_1").unwrap();
        reconciler.handle_delivery(&delivery).await.unwrap();
        let mut twice = db.subscription("sub_1").unwrap();

        assert_eq!(once.status, SUBSCRIPTION_STATUS_ACTIVE);
        assert_eq!(once.started_at, Some(1_709_251_200_000));
        twice.updated_at = once.updated_at;
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn canceled_records_cancellation_details() {
        let db = Arc::new(
            MockDb::default().with_subscription(active_subscription("sub_1", Uuid::new_v4())),
        );
        let receipt = reconciler(db.clone())
            .handle_delivery(&body(json!({
                "type": "subscription.canceled",
                "data": {
                    "id": "sub_1",
                    "canceled_at": "2024-01-01T00:00:00Z",
                    "customer_cancellation_reason": "too_expensive"
                }
            })))
            .await
            .unwrap();

        assert_eq!(receipt.outcome, ReconcileOutcome::Updated);
        let row = db.subscription("sub_1").unwrap();
        assert_eq!(row.status, SUBSCRIPTION_STATUS_CANCELED);
        assert_eq!(row.canceled_at, Some(1_704_067_200_000));
        assert_eq!(
            row.customer_cancellation_reason.as_deref(),
            Some("too_expensive")
        );
        assert_eq!(row.customer_cancellation_comment, None);
    }

    #[tokio::test]
    async fn uncanceled_clears_cancellation_fields() {
        let mut seeded = active_subscription("sub_1", Uuid::new_v4());
        seeded.status = SUBSCRIPTION_STATUS_CANCELED.into();
        seeded.canceled_at = Some(1);
        seeded.customer_cancellation_reason = Some("too_expensive".into());
        seeded.customer_cancellation_comment = Some("meh".into());
        seeded.cancel_at_period_end = true;
        let db = Arc::new(MockDb::default().with_subscription(seeded));

        reconciler(db.clone())
            .handle_delivery(&body(json!({
                "type": "subscription.uncanceled",
                "data": { "id": "sub_1", "status": "active" }
            })))
            .await
            .unwrap();

        let row = db.subscription("sub_1").unwrap();
        assert_eq!(row.status, SUBSCRIPTION_STATUS_ACTIVE);
        assert_eq!(row.canceled_at, None);
        assert_eq!(row.customer_cancellation_reason, None);
        assert_eq!(row.customer_cancellation_comment, None);
        assert!(!row.cancel_at_period_end);
    }

    #[tokio::test]
    async fn revoked_sets_status_and_end() {
        let db = Arc::new(
            MockDb::default().with_subscription(active_subscription("sub_1", Uuid::new_v4())),
        );
        reconciler(db.clone())
            .handle_delivery(&body(json!({
                "type": "subscription.revoked",
                "data": { "id": "sub_1", "status": "canceled", "ended_at": "2024-01-01T00:00:00Z" }
            })))
            .await
            .unwrap();

        let row = db.subscription("sub_1").unwrap();
        assert_eq!(row.status, SUBSCRIPTION_STATUS_REVOKED);
        assert_eq!(row.ended_at, Some(1_704_067_200_000));
    }

    #[tokio::test]
    async fn update_without_row_is_skipped_not_created() {
        let db = Arc::new(MockDb::default());
        let receipt = reconciler(db.clone())
            .handle_delivery(&updated("sub_missing", "active", 999))
            .await
            .unwrap();

        assert_eq!(receipt.outcome, ReconcileOutcome::Skipped);
        assert!(db.subscriptions.lock().unwrap().is_empty());
        assert_eq!(db.webhook_events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_created_is_audited_without_ledger_change() {
        let seeded = active_subscription("sub_1", Uuid::new_v4());
        let db = Arc::new(MockDb::default().with_subscription(seeded.clone()));

        let receipt = reconciler(db.clone())
            .handle_delivery(&body(json!({
                "type": "order.created",
                "data": { "id": "ord_1", "subscription_id": "sub_1" }
            })))
            .await
            .unwrap();

        assert_eq!(receipt.outcome, ReconcileOutcome::Logged);
        let events = db.webhook_events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "order.created");
        assert_eq!(events[0].polar_event_id.as_deref(), Some("ord_1"));
        assert_eq!(Some(events[0].id), receipt.event_id);
        assert_eq!(db.subscriptions.lock().unwrap().clone(), vec![seeded]);
    }

    #[tokio::test]
    async fn unknown_types_are_acknowledged() {
        let db = Arc::new(MockDb::default());
        let receipt = reconciler(db.clone())
            .handle_delivery(&body(json!({ "type": "benefit.granted", "data": { "id": "b_1" } })))
            .await
            .unwrap();
        assert_eq!(receipt.outcome, ReconcileOutcome::Logged);
        assert_eq!(db.webhook_events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failure_reports_audit_id() {
        let db = Arc::new(MockDb::default());
        let failure = reconciler(db.clone())
            .handle_delivery(&body(json!({
                "type": "subscription.created",
                "data": { "id": "sub_1", "status": "active", "metadata": {} }
            })))
            .await
            .unwrap_err();

        assert!(matches!(failure.error, WebhookError::MissingUserId(_)));
        let stored = db.webhook_events.lock().unwrap()[0].id;
        assert_eq!(failure.event_id, Some(stored));
        assert!(db.subscriptions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_fails_without_audit() {
        let db = Arc::new(MockDb::default());
        let failure = reconciler(db.clone())
            .handle_delivery(b"{not json")
            .await
            .unwrap_err();

        assert!(matches!(failure.error, WebhookError::InvalidJson(_)));
        assert!(failure.event_id.is_none());
        assert!(db.webhook_events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn database_failure_surfaces_as_error() {
        let db = Arc::new(MockDb::failing());
        let failure = reconciler(db)
            .handle_delivery(&updated("sub_1", "active", 1))
            .await
            .unwrap_err();

        assert!(matches!(failure.error, WebhookError::Database(_)));
        assert!(failure.event_id.is_none());
    }
}
