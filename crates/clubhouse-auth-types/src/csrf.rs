//! CSRF token derivation.
//!
//! A CSRF token is derived once per identity from the server secret and the
//! instant it was first needed, then cached by a `CsrfStore` for the life of
//! the store. Comparison is constant-time.

use chrono::{DateTime, Utc};
use clubhouse_domain::phone::PhoneIdentity;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Length of a CSRF token in hex characters.
pub const CSRF_TOKEN_LEN: usize = 32;

/// Derive the CSRF token for `identity` created at `created_at`.
pub fn derive_token(identity: &PhoneIdentity, secret: &str, created_at: DateTime<Utc>) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(b"csrf:");
    mac.update(identity.as_str().as_bytes());
    mac.update(b":");
    mac.update(created_at.timestamp_micros().to_string().as_bytes());
    let mut hex = hex::encode(mac.finalize().into_bytes());
    hex.truncate(CSRF_TOKEN_LEN);
    hex
}

/// Constant-time equality of a stored token and a submitted one.
pub fn tokens_match(stored: &str, submitted: &str) -> bool {
    stored.as_bytes().ct_eq(submitted.as_bytes()).into()
}
