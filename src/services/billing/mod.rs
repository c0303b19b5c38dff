//! Billing provider access: hosted checkout and customer-portal sessions.
pub mod live;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Checkout rejects customer emails on these domains, so they are dropped
/// and the provider collects an address itself.
pub const BLOCKED_EMAIL_DOMAINS: &[&str] = &["headshotmakerai.com"];

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Billing provider not configured")]
    MissingConfiguration,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("billing provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid response from billing provider")]
    InvalidResponse,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CheckoutRequest {
    pub product_price_id: String,
    pub success_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Returns the email to prefill at checkout, or `None` if it should be left out.
pub fn checkout_email(candidate: Option<&str>) -> Option<String> {
    let email = candidate.map(str::trim).filter(|e| !e.is_empty())?;
    let domain = email.split('@').nth(1)?.to_ascii_lowercase();
    if BLOCKED_EMAIL_DOMAINS.contains(&domain.as_str()) {
        return None;
    }
    Some(email.to_string())
}

/// Caller metadata with `userId` always stamped on top, so webhook
/// deliveries can be tied back to the account.
pub fn checkout_metadata(metadata: Option<Value>, user_id: &str) -> Map<String, Value> {
    let mut merged = match metadata {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    merged.insert("userId".into(), Value::String(user_id.to_string()));
    merged
}

#[async_trait]
pub trait BillingService: Send + Sync {
    async fn create_checkout(&self, req: CheckoutRequest) -> Result<CheckoutSession, BillingError>;

    /// Returns the customer-portal URL for `customer_id`.
    async fn create_portal_session(&self, customer_id: &str) -> Result<String, BillingError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blocked_domains_are_dropped() {
        assert_eq!(checkout_email(Some("jane@headshotmakerai.com")), None);
        assert_eq!(checkout_email(Some("jane@HeadshotMakerAI.com")), None);
        assert_eq!(
            checkout_email(Some("jane@example.com")).as_deref(),
            Some("jane@example.com")
        );
        assert_eq!(checkout_email(Some("not-an-email")), None);
        assert_eq!(checkout_email(None), None);
    }

    #[test]
    fn metadata_always_carries_user_id() {
        let merged = checkout_metadata(
            Some(json!({ "plan": "pro", "userId": "spoofed" })),
            "11111111-1111-1111-1111-111111111111",
        );
        assert_eq!(merged["plan"], "pro");
        assert_eq!(merged["userId"], "11111111-1111-1111-1111-111111111111");

        let merged = checkout_metadata(Some(json!("garbage")), "u");
        assert_eq!(merged.len(), 1);
    }
}
