pub mod auth;
pub mod billing;
pub mod entitlement;
pub mod generation;
pub mod webhook;
