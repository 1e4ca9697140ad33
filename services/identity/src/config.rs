use clubhouse_core::config::{flag, list, optional, parsed_or, required};
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::types::{
    DEFAULT_LOGIN_RATE_LIMIT_MAX, DEFAULT_LOGIN_RATE_LIMIT_WINDOW_SECS, DEFAULT_MAX_MEMBERS,
    join_url,
};

/// Server secret used when `SECRET_SALT` is unset. Fine for local runs only.
pub const DEFAULT_SECRET_SALT: &str = "change-me-please";

/// Identity service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL. When absent, login codes, rate limits and CSRF
    /// tokens live in process memory.
    pub redis_url: Option<String>,
    /// Secret for session and CSRF token signing. Env var: `SECRET_SALT`.
    pub secret_salt: String,
    /// Secure cookies and no login-code echo. Env var: `PRODUCTION_MODE`.
    pub production_mode: bool,
    pub site_name: String,
    /// Public base URL used in join links, e.g. "https://club.example.com".
    pub site_url: Option<String>,
    /// Textbelt API key. Without it SMS delivery is logged only.
    pub textbelt_key: Option<String>,
    /// Phones that join as admins. Env var: `ADMIN_PHONES` (comma-separated).
    pub admin_phones: Vec<PhoneIdentity>,
    pub max_members: u64,
    /// TCP port to listen on (default 8000). Env var: `IDENTITY_PORT`.
    pub identity_port: u16,
    pub login_rate_limit_max: u32,
    pub login_rate_limit_window_secs: i64,
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: required("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            secret_salt: optional("SECRET_SALT").unwrap_or_else(|| DEFAULT_SECRET_SALT.to_owned()),
            production_mode: flag("PRODUCTION_MODE"),
            site_name: optional("SITE_NAME").unwrap_or_else(|| "The Clubhouse".to_owned()),
            site_url: optional("SITE_URL").map(|url| url.trim_end_matches('/').to_owned()),
            textbelt_key: optional("TEXTBELT_KEY"),
            admin_phones: list("ADMIN_PHONES")
                .iter()
                .map(|raw| PhoneIdentity::normalize(raw))
                .filter(|phone| !phone.is_empty())
                .collect(),
            max_members: parsed_or("MAX_MEMBERS", DEFAULT_MAX_MEMBERS),
            identity_port: parsed_or("IDENTITY_PORT", 8000),
            login_rate_limit_max: parsed_or("LOGIN_RATE_LIMIT_MAX", DEFAULT_LOGIN_RATE_LIMIT_MAX),
            login_rate_limit_window_secs: parsed_or(
                "LOGIN_RATE_LIMIT_WINDOW_SECS",
                DEFAULT_LOGIN_RATE_LIMIT_WINDOW_SECS,
            ),
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_salt == DEFAULT_SECRET_SALT
    }

    pub fn join_url(&self, code: &str) -> String {
        join_url(self.site_url.as_deref(), code)
    }
}
