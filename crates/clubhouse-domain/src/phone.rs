//! Canonical phone identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical phone identity: the digits of a phone number with a leading US
/// country code removed.
///
/// This is the primary key of a member. Two identities denote the same phone
/// exactly when their strings are byte-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneIdentity(String);

impl PhoneIdentity {
    /// Normalize raw user input into a canonical identity.
    ///
    /// Strips every non-digit character, then drops a leading `1` when exactly
    /// 11 digits remain. Any other length is passed through untouched, so this
    /// never fails.
    ///
    /// ```
    /// use clubhouse_domain::phone::PhoneIdentity;
    ///
    /// assert_eq!(PhoneIdentity::normalize("+1 (555) 123-4567").as_str(), "5551234567");
    /// assert_eq!(PhoneIdentity::normalize("555.1234").as_str(), "5551234");
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 11 && digits.starts_with('1') {
            return Self(digits[1..].to_owned());
        }
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(XXX) XXX-XXXX` when the identity has exactly 10 digits, unchanged otherwise.
    pub fn format_for_display(&self) -> String {
        let p = &self.0;
        if p.len() == 10 {
            return format!("({}) {}-{}", &p[..3], &p[3..6], &p[6..]);
        }
        p.clone()
    }

    /// Last four digits only, for log lines.
    pub fn masked(&self) -> String {
        let keep = self.0.len().min(4);
        let (hidden, shown) = self.0.split_at(self.0.len() - keep);
        format!("{}{}", "*".repeat(hidden.len()), shown)
    }
}

impl fmt::Display for PhoneIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
