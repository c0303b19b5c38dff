use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is not configured")]
    MissingConfiguration(&'static str),
    /// Provider-supplied message, surfaced to the user verbatim.
    #[error("{0}")]
    Provider(String),
    #[error("Invalid response from authentication provider")]
    InvalidResponse,
    #[error("Authentication provider request failed: {0}")]
    Request(#[from] reqwest::Error),
}
