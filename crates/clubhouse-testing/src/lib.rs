//! Test utilities for Clubhouse services.
//!
//! Provides a controllable clock and session-cookie request headers.
//! Import in tests only, never in production code.

pub mod auth;
pub mod clock;
