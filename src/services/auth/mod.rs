pub mod client;
pub mod errors;
#[cfg(test)]
pub mod mock_auth;
pub mod service;
