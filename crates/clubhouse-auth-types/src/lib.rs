//! Auth types shared across Clubhouse services.
//!
//! Provides the stateless session token, CSRF token derivation, cookie
//! builders, and the `SessionIdentity` extractor.
//!
//! `SessionIdentity` is for services that only need to know who is calling.
//! The identity service itself uses its own extractors, which also check
//! that the member still exists.

pub mod cookie;
pub mod csrf;
pub mod identity;
pub mod session;
