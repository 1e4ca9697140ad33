//! Member domain types.

use serde::{Deserialize, Serialize};

/// Member permission tier.
///
/// Stored as two flags (`is_admin`, `is_moderator`); admin wins when both are set.
/// Moderator is granted and revoked by admins. Admin is assigned only at
/// bootstrap or through the `ADMIN_PHONES` list, never through promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Moderator,
    Admin,
}

impl MemberRole {
    pub fn from_flags(is_admin: bool, is_moderator: bool) -> Self {
        match (is_admin, is_moderator) {
            (true, _) => Self::Admin,
            (false, true) => Self::Moderator,
            (false, false) => Self::Member,
        }
    }
}

/// Lowercased alphanumerics of `name` with spaces turned into `_`; `user` if nothing is left.
///
/// ```
/// use clubhouse_domain::member::handle_base;
///
/// assert_eq!(handle_base("Mary Jo!"), "mary_jo");
/// assert_eq!(handle_base("!!!"), "user");
/// ```
pub fn handle_base(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        return "user".to_owned();
    }
    cleaned
}

/// The `attempt`-th handle to try for `base`: `base`, then `base2`, `base3`, ...
pub fn handle_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        return base.to_owned();
    }
    format!("{base}{attempt}")
}
