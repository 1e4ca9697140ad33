//! Redis-backed ephemeral stores, safe to share between instances.
//!
//! Each read-modify-write is a single Lua script so it runs atomically on the
//! server; expiry is delegated to key TTLs.

use chrono::{Duration, Utc};
use deadpool_redis::Pool;
use deadpool_redis::redis::{AsyncCommands, RedisError, Script};

use clubhouse_auth_types::cookie::SESSION_MAX_AGE_SECS;
use clubhouse_auth_types::csrf::{derive_token, tokens_match};
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{AttemptLimiter, ChallengeStore, CsrfStore};
use crate::domain::types::{LOGIN_CODE_TTL_SECS, generate_login_code};
use crate::error::IdentityError;

/// Delete the code only if it matches. Returns 1 on match.
const VERIFY_CODE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  redis.call('DEL', KEYS[1])
  return 1
end
return 0
"#;

/// Fixed window: the first attempt sets the TTL, attempts at the cap are not counted.
const ADMIT_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
  redis.call('SET', KEYS[1], 1, 'EX', ARGV[2])
  return 1
end
if tonumber(current) >= tonumber(ARGV[1]) then
  return 0
end
redis.call('INCR', KEYS[1])
return 1
"#;

/// Keep the first token written for the key and return it.
const CSRF_TOKEN_SCRIPT: &str = r#"
redis.call('SET', KEYS[1], ARGV[1], 'NX', 'EX', ARGV[2])
return redis.call('GET', KEYS[1])
"#;

#[derive(Clone)]
pub struct RedisStores {
    pub pool: Pool,
    pub secret: String,
}

fn login_code_key(phone: &PhoneIdentity) -> String {
    format!("login_code:{phone}")
}

fn attempts_key(phone: &PhoneIdentity) -> String {
    format!("login_attempts:{phone}")
}

fn csrf_key(phone: &PhoneIdentity) -> String {
    format!("csrf:{phone}")
}

impl RedisStores {
    async fn conn(&self) -> Result<deadpool_redis::Connection, IdentityError> {
        self.pool
            .get()
            .await
            .map_err(|e| IdentityError::Internal(e.into()))
    }
}

fn redis_error(e: RedisError) -> IdentityError {
    IdentityError::Internal(e.into())
}

impl ChallengeStore for RedisStores {
    async fn issue(&self, phone: &PhoneIdentity) -> Result<String, IdentityError> {
        let mut conn = self.conn().await?;
        let code = generate_login_code();
        let (): () = conn
            .set_ex(login_code_key(phone), &code, LOGIN_CODE_TTL_SECS as u64)
            .await
            .map_err(redis_error)?;
        Ok(code)
    }

    async fn verify(&self, phone: &PhoneIdentity, code: &str) -> Result<bool, IdentityError> {
        let mut conn = self.conn().await?;
        let matched: i64 = Script::new(VERIFY_CODE_SCRIPT)
            .key(login_code_key(phone))
            .arg(code)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(matched == 1)
    }
}

impl AttemptLimiter for RedisStores {
    async fn admit(
        &self,
        phone: &PhoneIdentity,
        max_attempts: u32,
        window: Duration,
    ) -> Result<bool, IdentityError> {
        let mut conn = self.conn().await?;
        let admitted: i64 = Script::new(ADMIT_SCRIPT)
            .key(attempts_key(phone))
            .arg(max_attempts)
            .arg(window.num_seconds().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(admitted == 1)
    }
}

impl CsrfStore for RedisStores {
    async fn token_for(&self, phone: &PhoneIdentity) -> Result<String, IdentityError> {
        let mut conn = self.conn().await?;
        let candidate = derive_token(phone, &self.secret, Utc::now());
        // Shared tokens outlive restarts, so they expire with the longest session.
        let token: String = Script::new(CSRF_TOKEN_SCRIPT)
            .key(csrf_key(phone))
            .arg(candidate)
            .arg(SESSION_MAX_AGE_SECS)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(token)
    }

    async fn verify(&self, phone: &PhoneIdentity, token: &str) -> Result<bool, IdentityError> {
        let mut conn = self.conn().await?;
        let stored: Option<String> = conn.get(csrf_key(phone)).await.map_err(redis_error)?;
        Ok(stored.is_some_and(|stored| tokens_match(&stored, token)))
    }
}
