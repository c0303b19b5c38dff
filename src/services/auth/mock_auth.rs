use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    errors::AuthError,
    service::{AuthProvider, AuthUser, PasswordSignUp, ProviderSession},
};

/// Canned provider. `exchange_error` fails the code exchange, `provider_error`
/// fails every other call; both take precedence over `session`.
#[derive(Default)]
pub struct MockAuthProvider {
    pub session: Option<ProviderSession>,
    pub signed_up_user: Option<AuthUser>,
    pub exchange_error: Option<String>,
    pub provider_error: Option<String>,
    pub exchanges: Mutex<Vec<(String, String)>>,
    pub refreshes: Mutex<Vec<String>>,
    pub sign_ups: Mutex<Vec<PasswordSignUp>>,
    pub sign_ins: Mutex<Vec<(String, String)>>,
    pub reset_requests: Mutex<Vec<(String, String)>>,
    pub password_updates: Mutex<Vec<(String, String)>>,
}

impl MockAuthProvider {
    pub fn exchange_count(&self) -> usize {
        self.exchanges.lock().unwrap().len()
    }

    fn outcome(&self) -> Result<(), AuthError> {
        match &self.provider_error {
            Some(message) => Err(AuthError::Provider(message.clone())),
            None => Ok(()),
        }
    }

    fn session_or_error(&self) -> Result<ProviderSession, AuthError> {
        self.outcome()?;
        self.session.clone().ok_or(AuthError::InvalidResponse)
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    fn authorize_url(&self, callback_url: &str, code_challenge: &str) -> Result<String, AuthError> {
        Ok(format!(
            "https://auth.test/authorize?redirect_to={}&code_challenge={}",
            urlencoding::encode(callback_url),
            code_challenge
        ))
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, AuthError> {
        self.exchanges
            .lock()
            .unwrap()
            .push((code.to_string(), code_verifier.to_string()));

        if let Some(message) = &self.exchange_error {
            return Err(AuthError::Provider(message.clone()));
        }
        self.session.clone().ok_or(AuthError::InvalidResponse)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, AuthError> {
        self.refreshes.lock().unwrap().push(refresh_token.to_string());
        self.session_or_error()
    }

    async fn sign_up(&self, signup: &PasswordSignUp) -> Result<Option<AuthUser>, AuthError> {
        self.sign_ups.lock().unwrap().push(signup.clone());
        self.outcome()?;
        Ok(self.signed_up_user.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, AuthError> {
        self.sign_ins
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));
        self.session_or_error()
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
        _code_challenge: &str,
    ) -> Result<(), AuthError> {
        self.reset_requests
            .lock()
            .unwrap()
            .push((email.to_string(), redirect_to.to_string()));
        self.outcome()
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        self.password_updates
            .lock()
            .unwrap()
            .push((access_token.to_string(), password.to_string()));
        self.outcome()
    }
}
