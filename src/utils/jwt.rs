use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Audience stamped on access tokens for signed-in users.
pub const SESSION_AUDIENCE: &str = "authenticated";

/// The subset of the auth provider's access-token claims we rely on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: usize,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Value>,
}

pub fn decode_access_token(
    token: &str,
    secret: &str,
) -> Result<TokenData<AccessClaims>, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[SESSION_AUDIENCE]);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    validation.required_spec_claims.insert("sub".to_string());

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
}

#[cfg(test)]
pub fn issue_test_token(secret: &str, user_id: uuid::Uuid, email: &str, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = AccessClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize,
        aud: SESSION_AUDIENCE.to_string(),
        email: Some(email.to_string()),
        role: Some("authenticated".into()),
        user_metadata: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token should encode")
}
