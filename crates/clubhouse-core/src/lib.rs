//! Service plumbing shared across Clubhouse services.
//!
//! Environment config helpers, health handlers, request-id middleware,
//! tracing setup, and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
