use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

const VERIFIER_LENGTH: usize = 64;

/// Random code verifier built from unreserved characters (RFC 7636 §4.1).
pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFIER_LENGTH)
        .map(char::from)
        .collect()
}

/// S256 code challenge for `verifier`.
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    BASE64_URL_SAFE_NO_PAD.encode(digest)
}
