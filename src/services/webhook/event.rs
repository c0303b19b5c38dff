use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::WebhookError;
use crate::models::subscription::{
    CancellationDetails, NewSubscription, SubscriptionRefresh,
};

/// Status recorded when `subscription.created` arrives without one.
const FALLBACK_CREATED_STATUS: &str = "created";

/// Raw delivery as posted by the billing provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl WebhookEnvelope {
    /// Provider id of the object the event is about.
    pub fn data_id(&self) -> Option<String> {
        match self.data.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SubscriptionPayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub recurring_interval: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub current_period_start: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<String>,
    #[serde(default)]
    pub cancel_at_period_end: Option<bool>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub canceled_at: Option<String>,
    #[serde(default)]
    pub customer_cancellation_reason: Option<String>,
    #[serde(default)]
    pub customer_cancellation_comment: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub custom_field_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    SubscriptionCreated(SubscriptionPayload),
    SubscriptionUpdated(SubscriptionPayload),
    SubscriptionActive(SubscriptionPayload),
    SubscriptionCanceled(SubscriptionPayload),
    SubscriptionUncanceled(SubscriptionPayload),
    SubscriptionRevoked(SubscriptionPayload),
    OrderCreated { order_id: Option<String> },
    Unknown { event_type: String },
}

impl BillingEvent {
    pub fn from_envelope(envelope: &WebhookEnvelope) -> Result<Self, WebhookError> {
        let subscription = || -> Result<SubscriptionPayload, WebhookError> {
            serde_json::from_value(envelope.data.clone()).map_err(|err| {
                WebhookError::InvalidPayload {
                    event_type: envelope.event_type.clone(),
                    reason: err.to_string(),
                }
            })
        };

        Ok(match envelope.event_type.as_str() {
            "subscription.created" => Self::SubscriptionCreated(subscription()?),
            "subscription.updated" => Self::SubscriptionUpdated(subscription()?),
            "subscription.active" => Self::SubscriptionActive(subscription()?),
            "subscription.canceled" => Self::SubscriptionCanceled(subscription()?),
            "subscription.uncanceled" => Self::SubscriptionUncanceled(subscription()?),
            "subscription.revoked" => Self::SubscriptionRevoked(subscription()?),
            "order.created" => Self::OrderCreated {
                order_id: envelope.data_id(),
            },
            other => Self::Unknown {
                event_type: other.to_string(),
            },
        })
    }
}

/// RFC 3339 instant to epoch milliseconds. Absent or empty values map to `None`.
pub fn parse_instant(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, WebhookError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.timestamp_millis()))
            .map_err(|_| WebhookError::InvalidTimestamp {
                field,
                value: value.to_string(),
            }),
    }
}

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn object_or_empty(raw: &Option<Map<String, Value>>) -> Value {
    Value::Object(raw.clone().unwrap_or_default())
}

impl SubscriptionPayload {
    pub fn owner_id(&self) -> Result<Uuid, WebhookError> {
        let raw = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("userId"))
            .and_then(Value::as_str)
            .ok_or_else(|| WebhookError::MissingUserId(self.id.clone()))?;
        Uuid::parse_str(raw.trim()).map_err(|_| WebhookError::InvalidUserId(raw.to_string()))
    }

    pub fn to_new_subscription(&self) -> Result<NewSubscription, WebhookError> {
        Ok(NewSubscription {
            polar_id: self.id.clone(),
            polar_price_id: self.price_id.clone(),
            user_id: self.owner_id()?,
            customer_id: self.customer_id.clone(),
            status: non_empty(&self.status).unwrap_or_else(|| FALLBACK_CREATED_STATUS.to_string()),
            currency: self.currency.clone(),
            billing_interval: self.recurring_interval.clone(),
            amount: self.amount,
            current_period_start: parse_instant(
                "current_period_start",
                self.current_period_start.as_deref(),
            )?,
            current_period_end: parse_instant(
                "current_period_end",
                self.current_period_end.as_deref(),
            )?,
            cancel_at_period_end: self.cancel_at_period_end.unwrap_or(false),
            started_at: parse_instant("started_at", self.started_at.as_deref())?,
            ended_at: parse_instant("ended_at", self.ended_at.as_deref())?,
            canceled_at: parse_instant("canceled_at", self.canceled_at.as_deref())?,
            customer_cancellation_reason: non_empty(&self.customer_cancellation_reason),
            customer_cancellation_comment: non_empty(&self.customer_cancellation_comment),
            metadata: object_or_empty(&self.metadata),
            custom_field_data: object_or_empty(&self.custom_field_data),
        })
    }

    pub fn to_refresh(&self) -> Result<SubscriptionRefresh, WebhookError> {
        Ok(SubscriptionRefresh {
            amount: self.amount,
            status: non_empty(&self.status),
            current_period_start: parse_instant(
                "current_period_start",
                self.current_period_start.as_deref(),
            )?,
            current_period_end: parse_instant(
                "current_period_end",
                self.current_period_end.as_deref(),
            )?,
            cancel_at_period_end: self.cancel_at_period_end.unwrap_or(false),
            metadata: object_or_empty(&self.metadata),
            custom_field_data: object_or_empty(&self.custom_field_data),
        })
    }

    pub fn to_cancellation(&self) -> Result<CancellationDetails, WebhookError> {
        Ok(CancellationDetails {
            canceled_at: parse_instant("canceled_at", self.canceled_at.as_deref())?,
            reason: non_empty(&self.customer_cancellation_reason),
            comment: non_empty(&self.customer_cancellation_comment),
        })
    }

    pub fn started_at_millis(&self) -> Result<Option<i64>, WebhookError> {
        parse_instant("started_at", self.started_at.as_deref())
    }

    pub fn ended_at_millis(&self) -> Result<Option<i64>, WebhookError> {
        parse_instant("ended_at", self.ended_at.as_deref())
    }
}
