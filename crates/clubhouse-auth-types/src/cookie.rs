//! Cookie builders for the session token and the admin view-mode flag.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "clubhouse";

/// Session cookie Max-Age in seconds (30 days). This is the only session expiry.
pub const SESSION_MAX_AGE_SECS: i64 = 2_592_000;

/// Cookie name for the admin "view as member" presentation flag.
pub const VIEW_AS_MEMBER_COOKIE: &str = "view_as_member";

/// View-mode cookie Max-Age in seconds (1 hour).
pub const VIEW_AS_MEMBER_MAX_AGE_SECS: i64 = 3600;

/// Set the session cookie on the jar.
///
/// `secure` should be `true` in production so the token only travels over HTTPS.
///
/// ```
/// use axum_extra::extract::cookie::{CookieJar, SameSite};
/// use clubhouse_auth_types::cookie::{set_session_cookie, SESSION_COOKIE};
///
/// let jar = set_session_cookie(CookieJar::new(), "token_value".to_string(), true);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(2_592_000)));
/// assert_eq!(cookie.same_site(), Some(SameSite::Lax));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, secure: bool) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use clubhouse_auth_types::cookie::{clear_session_cookie, set_session_cookie, SESSION_COOKIE};
///
/// let jar = set_session_cookie(CookieJar::new(), "t".to_string(), false);
/// let jar = clear_session_cookie(jar, false);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Set the admin "view as member" flag.
///
/// Readable by scripts (not http-only) so the page toolbar can show it. This is a
/// presentation toggle only and must never be trusted for authorization.
pub fn set_view_as_member_cookie(jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((VIEW_AS_MEMBER_COOKIE, "1"))
        .path("/")
        .max_age(Duration::seconds(VIEW_AS_MEMBER_MAX_AGE_SECS))
        .http_only(false)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn clear_view_as_member_cookie(jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((VIEW_AS_MEMBER_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build();
    jar.add(cookie)
}

pub fn is_viewing_as_member(jar: &CookieJar) -> bool {
    jar.get(VIEW_AS_MEMBER_COOKIE)
        .is_some_and(|c| c.value() == "1")
}
