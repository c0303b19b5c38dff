use std::sync::Arc;

use crate::config::Config;
use crate::db::{
    headshot_repository::HeadshotRepository, subscription_repository::SubscriptionRepository,
    user_repository::UserRepository, webhook_event_repository::WebhookEventRepository,
};
use crate::services::{
    auth::service::AuthProvider, billing::BillingService, generation::ImageGenerator,
    webhook::WebhookReconciler,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub headshots: Arc<dyn HeadshotRepository>,
    pub auth: Arc<dyn AuthProvider>,
    pub billing: Arc<dyn BillingService>,
    pub generator: Arc<dyn ImageGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn webhook_reconciler(&self) -> WebhookReconciler {
        WebhookReconciler::new(self.subscriptions.clone(), self.webhook_events.clone())
    }
}
