//! Stateless session token.
//!
//! Wire format: `hex(HMAC-SHA256(key = secret, msg = identity))[..20] ++ identity`.
//!
//! The token carries no expiry of its own; the session cookie's Max-Age is the
//! only lifetime bound. A token stays valid for as long as the server secret is
//! unchanged, so rotating the secret revokes every session at once.

use clubhouse_domain::phone::PhoneIdentity;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Number of hex characters of the HMAC kept as the token prefix.
pub const SIGNATURE_LEN: usize = 20;

fn signature(identity: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(identity.as_bytes());
    let mut hex = hex::encode(mac.finalize().into_bytes());
    hex.truncate(SIGNATURE_LEN);
    hex
}

/// Mint a session token for `identity`.
///
/// ```
/// use clubhouse_auth_types::session::{mint, read};
/// use clubhouse_domain::phone::PhoneIdentity;
///
/// let phone = PhoneIdentity::normalize("5551234567");
/// let token = mint(&phone, "secret");
/// assert!(token.ends_with("5551234567"));
/// assert_eq!(read(&token, "secret"), Some(phone));
/// ```
pub fn mint(identity: &PhoneIdentity, secret: &str) -> String {
    let mut token = signature(identity.as_str(), secret);
    token.push_str(identity.as_str());
    token
}

/// Validate a session token and return the identity it was minted for.
///
/// Returns `None` for anything that is not a token produced by [`mint`] with
/// the same `secret`. Callers treat `None` as "not authenticated".
pub fn read(token: &str, secret: &str) -> Option<PhoneIdentity> {
    if token.len() <= SIGNATURE_LEN {
        return None;
    }
    let prefix = token.get(..SIGNATURE_LEN)?;
    let claimed = token.get(SIGNATURE_LEN..)?;
    let expected = signature(claimed, secret);
    if !bool::from(prefix.as_bytes().ct_eq(expected.as_bytes())) {
        return None;
    }
    Some(PhoneIdentity::normalize(claimed))
}
