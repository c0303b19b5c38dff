pub mod jwt;
pub mod origin;
pub mod pkce;
pub mod signature;
pub mod usage_limits;
