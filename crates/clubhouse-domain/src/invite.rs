//! Invite code values.

use rand::RngExt;

/// Words used as the prefix of generated invite codes.
pub const INVITE_WORDS: [&str; 10] = [
    "MOON", "STAR", "TREE", "BIRD", "FISH", "BEAR", "WOLF", "FROG", "LAKE", "RAIN",
];

/// Generate a human-friendly invite code such as `MOON-742`.
///
/// The numeric part is always three digits (`100`..=`999`). Uniqueness is the
/// caller's concern: codes collide often enough that the ledger must retry.
pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    let word = INVITE_WORDS[rng.random_range(0..INVITE_WORDS.len())];
    let number: u16 = rng.random_range(100..=999);
    format!("{word}-{number}")
}

/// Canonical form of a code typed by a user: trimmed and uppercased.
pub fn normalize_invite_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// `true` if `code` has the `WORD-NNN` shape produced by [`generate_invite_code`].
pub fn is_well_formed(code: &str) -> bool {
    let Some((word, number)) = code.split_once('-') else {
        return false;
    };
    INVITE_WORDS.contains(&word) && number.len() == 3 && number.bytes().all(|b| b.is_ascii_digit())
}
