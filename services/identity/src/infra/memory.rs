//! In-process ephemeral stores.
//!
//! Correct only while a single process serves all traffic. Deployments with
//! more than one instance must configure `REDIS_URL` instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use clubhouse_auth_types::csrf::{derive_token, tokens_match};
use clubhouse_domain::clock::Clock;
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{AttemptLimiter, ChallengeStore, CsrfStore};
use crate::domain::types::{generate_login_code, login_code_ttl};
use crate::error::IdentityError;

/// A value that knows when it stops being live.
pub trait Expiring {
    fn is_expired(&self, now: DateTime<Utc>) -> bool;
}

/// Identity-keyed map whose expired entries read as absent.
///
/// Each method holds the lock for its whole body, so `update` is an atomic
/// read-modify-write for one key.
pub struct ExpiringMap<V> {
    entries: Mutex<HashMap<PhoneIdentity, V>>,
}

impl<V> Default for ExpiringMap<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Expiring> ExpiringMap<V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<PhoneIdentity, V>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &PhoneIdentity, now: DateTime<Utc>) -> Option<V>
    where
        V: Clone,
    {
        self.lock()
            .get(key)
            .filter(|v| !v.is_expired(now))
            .cloned()
    }

    pub fn set(&self, key: PhoneIdentity, value: V) {
        self.lock().insert(key, value);
    }

    pub fn delete(&self, key: &PhoneIdentity) -> Option<V> {
        self.lock().remove(key)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, v| !v.is_expired(now));
        before - entries.len()
    }

    /// Apply `f` to the live entry for `key` (or `None`), storing whatever
    /// `f` leaves behind.
    pub fn update<R>(
        &self,
        key: &PhoneIdentity,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Option<V>) -> R,
    ) -> R {
        let mut entries = self.lock();
        let mut slot = entries.remove(key).filter(|v| !v.is_expired(now));
        let result = f(&mut slot);
        if let Some(value) = slot {
            entries.insert(key.clone(), value);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Login codes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Challenge {
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl Expiring for Challenge {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > login_code_ttl()
    }
}

#[derive(Clone)]
pub struct MemoryChallengeStore {
    codes: Arc<ExpiringMap<Challenge>>,
    clock: Arc<dyn Clock>,
}

impl MemoryChallengeStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: Arc::default(),
            clock,
        }
    }

    /// Number of stored challenges, live or not yet swept.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl ChallengeStore for MemoryChallengeStore {
    async fn issue(&self, phone: &PhoneIdentity) -> Result<String, IdentityError> {
        let code = generate_login_code();
        self.codes.set(
            phone.clone(),
            Challenge {
                code: code.clone(),
                issued_at: self.clock.now(),
            },
        );
        Ok(code)
    }

    async fn verify(&self, phone: &PhoneIdentity, code: &str) -> Result<bool, IdentityError> {
        let now = self.clock.now();
        self.codes.sweep_expired(now);
        let matched = self.codes.update(phone, now, |slot| match slot {
            Some(challenge) if challenge.code == code => {
                *slot = None;
                true
            }
            _ => false,
        });
        Ok(matched)
    }
}

// ── Attempt windows ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AttemptWindow {
    pub attempts: u32,
    pub reset_at: DateTime<Utc>,
}

impl Expiring for AttemptWindow {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }
}

#[derive(Clone)]
pub struct MemoryAttemptLimiter {
    windows: Arc<ExpiringMap<AttemptWindow>>,
    clock: Arc<dyn Clock>,
}

impl MemoryAttemptLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Arc::default(),
            clock,
        }
    }

    /// Attempts counted in the live window for `phone`.
    pub fn attempts(&self, phone: &PhoneIdentity) -> Option<u32> {
        self.windows
            .get(phone, self.clock.now())
            .map(|w| w.attempts)
    }
}

impl AttemptLimiter for MemoryAttemptLimiter {
    async fn admit(
        &self,
        phone: &PhoneIdentity,
        max_attempts: u32,
        window: Duration,
    ) -> Result<bool, IdentityError> {
        let now = self.clock.now();
        self.windows.sweep_expired(now);
        let admitted = self.windows.update(phone, now, |slot| match slot {
            None => {
                *slot = Some(AttemptWindow {
                    attempts: 1,
                    reset_at: now + window,
                });
                true
            }
            Some(w) if w.attempts >= max_attempts => false,
            Some(w) => {
                w.attempts += 1;
                true
            }
        });
        Ok(admitted)
    }
}

// ── CSRF tokens ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CsrfEntry(pub String);

impl Expiring for CsrfEntry {
    fn is_expired(&self, _now: DateTime<Utc>) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct MemoryCsrfStore {
    tokens: Arc<ExpiringMap<CsrfEntry>>,
    secret: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl MemoryCsrfStore {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: Arc::default(),
            secret: Arc::from(secret),
            clock,
        }
    }
}

impl CsrfStore for MemoryCsrfStore {
    async fn token_for(&self, phone: &PhoneIdentity) -> Result<String, IdentityError> {
        let now = self.clock.now();
        let token = self.tokens.update(phone, now, |slot| {
            slot.get_or_insert_with(|| CsrfEntry(derive_token(phone, &self.secret, now)))
                .0
                .clone()
        });
        Ok(token)
    }

    async fn verify(&self, phone: &PhoneIdentity, token: &str) -> Result<bool, IdentityError> {
        Ok(self
            .tokens
            .get(phone, self.clock.now())
            .is_some_and(|stored| tokens_match(&stored.0, token)))
    }
}

/// The three in-process stores sharing one clock.
#[derive(Clone)]
pub struct MemoryStores {
    pub challenges: MemoryChallengeStore,
    pub attempts: MemoryAttemptLimiter,
    pub csrf: MemoryCsrfStore,
}

impl MemoryStores {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            challenges: MemoryChallengeStore::new(clock.clone()),
            attempts: MemoryAttemptLimiter::new(clock.clone()),
            csrf: MemoryCsrfStore::new(secret, clock),
        }
    }
}
