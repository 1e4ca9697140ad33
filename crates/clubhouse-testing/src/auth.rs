//! Session helpers for integration tests.
//!
//! Mints a real session token so requests go through the same cookie
//! verification as production traffic.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use clubhouse_auth_types::cookie::SESSION_COOKIE;
use clubhouse_auth_types::csrf::CSRF_HEADER;
use clubhouse_auth_types::session;
use clubhouse_domain::phone::PhoneIdentity;

/// A signed-in caller for test requests.
pub struct MockSession {
    pub phone: PhoneIdentity,
    pub secret: String,
}

impl MockSession {
    pub fn new(raw_phone: &str, secret: &str) -> Self {
        Self {
            phone: PhoneIdentity::normalize(raw_phone),
            secret: secret.to_owned(),
        }
    }

    pub fn token(&self) -> String {
        session::mint(&self.phone, &self.secret)
    }

    /// `Cookie` header carrying the session token.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", self.token())).unwrap(),
        );
        map
    }

    /// Session cookie plus the CSRF header required on writes.
    pub fn headers_with_csrf(&self, csrf_token: &str) -> HeaderMap {
        let mut map = self.headers();
        map.insert(
            HeaderName::from_static(CSRF_HEADER),
            HeaderValue::from_str(csrf_token).unwrap(),
        );
        map
    }
}
