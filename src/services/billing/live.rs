use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{BillingError, BillingService, CheckoutRequest, CheckoutSession};
use crate::config::PolarSettings;

pub struct PolarBillingService {
    client: Client,
    settings: PolarSettings,
}

#[derive(Deserialize)]
struct CustomerSessionResponse {
    customer_portal_url: String,
}

impl PolarBillingService {
    pub fn new(client: Client, settings: PolarSettings) -> Self {
        Self { client, settings }
    }

    fn access_token(&self) -> Result<&str, BillingError> {
        self.settings
            .access_token
            .as_deref()
            .ok_or(BillingError::MissingConfiguration)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_base, path)
    }

    async fn api_error(res: Response) -> BillingError {
        let status = res.status().as_u16();
        let body: Value = res.json().await.unwrap_or(Value::Null);
        let message = body
            .get("detail")
            .and_then(|d| match d {
                Value::String(s) => Some(s.clone()),
                other if !other.is_null() => Some(other.to_string()),
                _ => None,
            })
            .or_else(|| body.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("billing provider returned status {status}"));
        BillingError::Api { status, message }
    }
}

#[async_trait]
impl BillingService for PolarBillingService {
    async fn create_checkout(&self, req: CheckoutRequest) -> Result<CheckoutSession, BillingError> {
        let token = self.access_token()?;
        let res = self
            .client
            .post(self.url("/v1/checkouts/custom/"))
            .bearer_auth(token)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Self::api_error(res).await);
        }

        res.json::<CheckoutSession>()
            .await
            .map_err(|_| BillingError::InvalidResponse)
    }

    async fn create_portal_session(&self, customer_id: &str) -> Result<String, BillingError> {
        let token = self.access_token()?;
        let res = self
            .client
            .post(self.url("/v1/customer-sessions/"))
            .bearer_auth(token)
            .json(&json!({ "customer_id": customer_id }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Self::api_error(res).await);
        }

        let session: CustomerSessionResponse =
            res.json().await.map_err(|_| BillingError::InvalidResponse)?;
        Ok(session.customer_portal_url)
    }
}
