use std::sync::Mutex;

use async_trait::async_trait;

use super::{BillingError, BillingService, CheckoutRequest, CheckoutSession};

#[derive(Default)]
pub struct MockBillingService {
    pub checkout_requests: Mutex<Vec<CheckoutRequest>>,
    pub portal_requests: Mutex<Vec<String>>,
    pub fail_with: Option<String>,
}

impl MockBillingService {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn failure(&self) -> Option<BillingError> {
        self.fail_with.as_ref().map(|message| BillingError::Api {
            status: 500,
            message: message.clone(),
        })
    }
}

#[async_trait]
impl BillingService for MockBillingService {
    async fn create_checkout(&self, req: CheckoutRequest) -> Result<CheckoutSession, BillingError> {
        self.checkout_requests.lock().unwrap().push(req);
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(CheckoutSession {
            id: "chk_test".into(),
            url: "https://billing.test/checkout/chk_test".into(),
        })
    }

    async fn create_portal_session(&self, customer_id: &str) -> Result<String, BillingError> {
        self.portal_requests
            .lock()
            .unwrap()
            .push(customer_id.to_string());
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(format!("https://billing.test/portal/{customer_id}"))
    }
}
