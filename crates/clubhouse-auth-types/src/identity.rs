//! Session-cookie identity extractor.

use axum::extract::FromRequestParts;
use axum_extra::extract::CookieJar;
use clubhouse_domain::phone::PhoneIdentity;
use http::{HeaderMap, StatusCode};
use http::request::Parts;

use crate::cookie::SESSION_COOKIE;
use crate::session;

/// Application state that knows the server secret used to sign session tokens.
pub trait SessionSecret {
    fn session_secret(&self) -> &str;
}

/// Read and verify the session cookie from raw request headers.
///
/// Shared by [`SessionIdentity`] and service extractors that need to do async
/// work (directory lookups) after the cookie has been verified.
pub fn identity_from_headers(headers: &HeaderMap, secret: &str) -> Option<PhoneIdentity> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .and_then(|c| session::read(c.value(), secret))
}

/// Identity carried by a valid session cookie.
///
/// Returns 401 if the cookie is absent or its signature does not verify.
/// This proves only that the server once minted the token: callers must still
/// confirm the member exists before acting on it.
#[derive(Debug, Clone)]
pub struct SessionIdentity(pub PhoneIdentity);

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: SessionSecret + Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract synchronously and return a 'static async block so the future does
    // not borrow `parts` or `state`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = identity_from_headers(&parts.headers, state.session_secret());

        async move {
            let identity = identity.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self(identity))
        }
    }
}
