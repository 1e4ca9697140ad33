//! Wall-clock source.
//!
//! Expiry windows (login codes, rate-limit windows) are compared against the
//! time a request is handled. Stores take a `Clock` so tests can move time.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
