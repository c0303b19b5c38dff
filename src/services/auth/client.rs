use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use crate::{
    config::SupabaseSettings,
    services::auth::{
        errors::AuthError,
        service::{AuthProvider, AuthUser, PasswordSignUp, ProviderSession},
    },
};

pub struct SupabaseAuthClient {
    pub client: Client,
    pub settings: SupabaseSettings,
}

impl SupabaseAuthClient {
    fn base_url(&self) -> Result<&str, AuthError> {
        self.settings
            .url
            .as_deref()
            .ok_or(AuthError::MissingConfiguration("SUPABASE_URL"))
    }

    fn anon_key(&self) -> Result<&str, AuthError> {
        self.settings
            .anon_key
            .as_deref()
            .ok_or(AuthError::MissingConfiguration("SUPABASE_ANON_KEY"))
    }

    fn endpoint(&self, path: &str) -> Result<String, AuthError> {
        Ok(format!("{}/auth/v1/{}", self.base_url()?, path))
    }

    /// Sends a GoTrue request and returns the JSON body of a 2xx reply.
    /// Empty or non-JSON success bodies come back as `Value::Null`.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Value, AuthError> {
        let res = request.header("apikey", self.anon_key()?).send().await?;
        let status = res.status();
        let text = res.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = provider_error_message(&body)
                .unwrap_or_else(|| format!("{action} failed with status {status}"));
            return Err(AuthError::Provider(message));
        }
        Ok(body)
    }

    async fn token_grant(&self, grant_type: &str, payload: Value) -> Result<ProviderSession, AuthError> {
        let url = self.endpoint(&format!("token?grant_type={grant_type}"))?;
        let body = self
            .send(self.client.post(url).json(&payload), "Session request")
            .await?;
        serde_json::from_value(body).map_err(|_| AuthError::InvalidResponse)
    }
}

/// Pulls the human readable message out of a GoTrue error body.
fn provider_error_message(body: &Value) -> Option<String> {
    ["error_description", "msg", "message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.trim().is_empty())
        .map(str::to_string)
}

/// Signup answers with a bare user while confirmation is pending and with a
/// full session once the account is usable.
fn signed_up_user(body: Value) -> Option<AuthUser> {
    let user = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    serde_json::from_value(user).ok()
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    fn authorize_url(&self, callback_url: &str, code_challenge: &str) -> Result<String, AuthError> {
        let base = self.base_url()?;
        Ok(format!(
            "{}/auth/v1/authorize?provider=google&redirect_to={}&code_challenge={}&code_challenge_method=s256&access_type=offline&prompt=consent",
            base,
            urlencoding::encode(callback_url),
            code_challenge,
        ))
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, AuthError> {
        self.token_grant(
            "pkce",
            json!({ "auth_code": code, "code_verifier": code_verifier }),
        )
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, AuthError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_up(&self, signup: &PasswordSignUp) -> Result<Option<AuthUser>, AuthError> {
        let url = self.endpoint(&format!(
            "signup?redirect_to={}",
            urlencoding::encode(&signup.redirect_to)
        ))?;
        let payload = json!({
            "email": signup.email,
            "password": signup.password,
            "data": { "full_name": signup.full_name, "email": signup.email },
        });
        let body = self
            .send(self.client.post(url).json(&payload), "Sign up")
            .await?;
        Ok(signed_up_user(body))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, AuthError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AuthError> {
        let url = self.endpoint(&format!(
            "recover?redirect_to={}",
            urlencoding::encode(redirect_to)
        ))?;
        self.send(
            self.client.post(url).json(&json!({
                "email": email,
                "code_challenge": code_challenge,
                "code_challenge_method": "s256",
            })),
            "Password recovery",
        )
        .await?;
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        let url = self.endpoint("user")?;
        self.send(
            self.client
                .put(url)
                .bearer_auth(access_token)
                .json(&json!({ "password": password })),
            "Password update",
        )
        .await?;
        Ok(())
    }
}
