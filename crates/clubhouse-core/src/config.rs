//! Helpers for loading service configuration from environment variables.
//!
//! Services build their config struct field by field with these helpers in a
//! `from_env()` constructor that runs once at startup.

use std::str::FromStr;

/// Read a required variable.
///
/// # Panics
///
/// Panics if the variable is missing.
pub fn required(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

/// Read an optional variable, treating an empty value as absent.
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse a variable, falling back to `default` when absent or unparsable.
pub fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag: `true`/`1`/`yes` (any case) are true, anything else false.
pub fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Read a comma-separated list, dropping empty items.
pub fn list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
