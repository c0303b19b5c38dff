use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::services::auth::errors::AuthError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// Display name from provider metadata, `full_name` first.
    pub fn display_name(&self) -> Option<String> {
        ["full_name", "name"]
            .iter()
            .filter_map(|key| self.user_metadata.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordSignUp {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Where the confirmation link sends the user.
    pub redirect_to: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Google sign-in URL that returns to `callback_url` with a PKCE code.
    fn authorize_url(&self, callback_url: &str, code_challenge: &str) -> Result<String, AuthError>;

    /// One-shot exchange; a code is never retried.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, AuthError>;

    /// Trades a refresh token for a fresh session. Refresh tokens rotate, so
    /// the returned session carries the replacement.
    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, AuthError>;

    /// Registers an email/password account. `None` when the provider hides
    /// the user until the address is confirmed.
    async fn sign_up(&self, signup: &PasswordSignUp) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, AuthError>;

    /// Mails a recovery link that lands on `redirect_to` with a PKCE code,
    /// exchanged later like any other sign-in.
    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AuthError>;

    /// Sets a new password for the user owning `access_token`.
    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_prefers_full_name() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: None,
            user_metadata: json!({ "name": "Janie", "full_name": "Jane Doe" }),
        };
        assert_eq!(user.display_name().as_deref(), Some("Jane Doe"));

        let user = AuthUser {
            user_metadata: json!({ "name": "Janie", "full_name": "  " }),
            ..user
        };
        assert_eq!(user.display_name().as_deref(), Some("Janie"));
    }
}
