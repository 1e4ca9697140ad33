use chrono::Duration;

use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{AttemptLimiter, ChallengeStore, CsrfStore};
use crate::error::IdentityError;
use crate::infra::cache::RedisStores;
use crate::infra::memory::MemoryStores;

/// Login codes, attempt windows and CSRF tokens behind one deployment choice.
#[derive(Clone)]
pub enum EphemeralStores {
    Memory(MemoryStores),
    Redis(RedisStores),
}

impl EphemeralStores {
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }
}

impl ChallengeStore for EphemeralStores {
    async fn issue(&self, phone: &PhoneIdentity) -> Result<String, IdentityError> {
        match self {
            Self::Memory(m) => m.challenges.issue(phone).await,
            Self::Redis(r) => r.issue(phone).await,
        }
    }

    async fn verify(&self, phone: &PhoneIdentity, code: &str) -> Result<bool, IdentityError> {
        match self {
            Self::Memory(m) => ChallengeStore::verify(&m.challenges, phone, code).await,
            Self::Redis(r) => ChallengeStore::verify(r, phone, code).await,
        }
    }
}

impl AttemptLimiter for EphemeralStores {
    async fn admit(
        &self,
        phone: &PhoneIdentity,
        max_attempts: u32,
        window: Duration,
    ) -> Result<bool, IdentityError> {
        match self {
            Self::Memory(m) => m.attempts.admit(phone, max_attempts, window).await,
            Self::Redis(r) => r.admit(phone, max_attempts, window).await,
        }
    }
}

impl CsrfStore for EphemeralStores {
    async fn token_for(&self, phone: &PhoneIdentity) -> Result<String, IdentityError> {
        match self {
            Self::Memory(m) => m.csrf.token_for(phone).await,
            Self::Redis(r) => r.token_for(phone).await,
        }
    }

    async fn verify(&self, phone: &PhoneIdentity, token: &str) -> Result<bool, IdentityError> {
        match self {
            Self::Memory(m) => CsrfStore::verify(&m.csrf, phone, token).await,
            Self::Redis(r) => CsrfStore::verify(r, phone, token).await,
        }
    }
}
