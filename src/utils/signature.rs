use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    /// No secret configured, nothing to compare against.
    Unconfigured,
    Missing,
    Valid,
    Invalid,
}

impl SignatureCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureCheck::Unconfigured => "unconfigured",
            SignatureCheck::Missing => "missing",
            SignatureCheck::Valid => "valid",
            SignatureCheck::Invalid => "invalid",
        }
    }
}

pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Compares `header` (hex, optionally prefixed `sha256=` or `v1,`) with the
/// HMAC-SHA256 of `body` in constant time.
pub fn check_signature(secret: Option<&str>, header: Option<&str>, body: &[u8]) -> SignatureCheck {
    let Some(secret) = secret else {
        return SignatureCheck::Unconfigured;
    };
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return SignatureCheck::Missing;
    };

    let provided = header
        .strip_prefix("sha256=")
        .or_else(|| header.strip_prefix("v1,"))
        .unwrap_or(header)
        .to_ascii_lowercase();
    let expected = sign_payload(secret, body);

    if subtle::ConstantTimeEq::ct_eq(expected.as_bytes(), provided.as_bytes()).unwrap_u8() == 1 {
        SignatureCheck::Valid
    } else {
        SignatureCheck::Invalid
    }
}
