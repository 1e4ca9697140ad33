use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use serde::Serialize;

use clubhouse_domain::member::MemberRole;
use clubhouse_domain::phone::PhoneIdentity;

/// A row in the membership directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub phone: PhoneIdentity,
    pub name: String,
    pub handle: Option<String>,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn role(&self) -> MemberRole {
        MemberRole::from_flags(self.is_admin, self.is_moderator)
    }
}

/// An invite code and its redemption state. `used_by` transitions from
/// `None` to `Some` at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteCode {
    pub code: String,
    pub created_by: PhoneIdentity,
    pub used_by: Option<PhoneIdentity>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl InviteCode {
    pub fn new(code: String, created_by: PhoneIdentity, created_at: DateTime<Utc>) -> Self {
        Self {
            code,
            created_by,
            used_by: None,
            created_at,
            used_at: None,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        self.used_by.is_some()
    }
}

/// Login code time-to-live in seconds.
pub const LOGIN_CODE_TTL_SECS: i64 = 600;

/// Default cap on login-code requests per identity per window.
pub const DEFAULT_LOGIN_RATE_LIMIT_MAX: u32 = 10;

/// Default login rate-limit window in seconds.
pub const DEFAULT_LOGIN_RATE_LIMIT_WINDOW_SECS: i64 = 3600;

/// Default cap on directory size.
pub const DEFAULT_MAX_MEMBERS: u64 = 200;

/// Invite codes seeded for the first administrator.
pub const BOOTSTRAP_INVITE_COUNT: usize = 3;

/// Attempts at drawing an unused invite code before giving up.
pub const MAX_INVITE_CODE_ATTEMPTS: usize = 100;

/// Attempts at finding a free handle before giving up.
pub const MAX_HANDLE_ATTEMPTS: u32 = 1000;

pub fn login_code_ttl() -> Duration {
    Duration::seconds(LOGIN_CODE_TTL_SECS)
}

/// Absolute join link for `code` when the public URL is known, else a
/// site-relative one.
pub fn join_url(site_url: Option<&str>, code: &str) -> String {
    match site_url {
        Some(base) => format!("{}/join/{code}", base.trim_end_matches('/')),
        None => format!("/join/{code}"),
    }
}

/// Draw a six-digit login code, uniformly from 100000..=999999.
pub fn generate_login_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}
