pub mod headshot;
pub mod subscription;
pub mod user;
pub mod webhook_event;
