pub mod headshot_repository;
#[cfg(test)]
pub mod mock_db;
pub mod postgres_headshot_repository;
pub mod postgres_subscription_repository;
pub mod postgres_user_repository;
pub mod postgres_webhook_event_repository;
pub mod subscription_repository;
pub mod user_repository;
pub mod webhook_event_repository;
