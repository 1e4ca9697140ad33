#![allow(async_fn_in_trait)]

use chrono::Duration;

use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::types::{InviteCode, Member};
use crate::error::IdentityError;

/// Durable membership directory.
pub trait MemberDirectory: Send + Sync {
    async fn find_by_identity(
        &self,
        phone: &PhoneIdentity,
    ) -> Result<Option<Member>, IdentityError>;

    async fn count(&self) -> Result<u64, IdentityError>;

    /// Set whichever role flags are given. No-op if the member does not exist.
    async fn update_role(
        &self,
        phone: &PhoneIdentity,
        is_admin: Option<bool>,
        is_moderator: Option<bool>,
    ) -> Result<(), IdentityError>;

    /// Insert `admin` and its seed `invites` in one transaction, only if the
    /// directory is empty. Fails with `AlreadyInitialized` otherwise.
    async fn insert_first_admin(
        &self,
        admin: &Member,
        invites: &[InviteCode],
    ) -> Result<(), IdentityError>;
}

/// Durable invite-code ledger.
pub trait InviteLedger: Send + Sync {
    async fn exists(&self, code: &str) -> Result<bool, IdentityError>;

    /// The invite for `code` if it exists and has not been redeemed.
    async fn find_unused(&self, code: &str) -> Result<Option<InviteCode>, IdentityError>;

    /// Insert a fresh invite. Returns `false` if the code is already taken.
    async fn insert(&self, invite: &InviteCode) -> Result<bool, IdentityError>;

    /// Redeem `code` for `member` and add the member to the directory, atomically.
    ///
    /// The stored member gets the first free handle derived from its name
    /// (`alice`, `alice2`, ...), chosen inside the same transaction, and is
    /// returned. Concurrent redemptions are serialized, so the capacity check
    /// holds across them.
    ///
    /// Fails with `InvalidInviteCode` if the code is unknown or already used,
    /// `CommunityFull` if the directory holds `max_members`, and
    /// `AlreadyMember` if `member.phone` is already in the directory. Nothing
    /// is written on failure.
    async fn redeem(
        &self,
        code: &str,
        member: &Member,
        max_members: u64,
    ) -> Result<Member, IdentityError>;
}

/// Short-lived login codes, at most one live code per identity.
pub trait ChallengeStore: Send + Sync {
    /// Issue a fresh code for `phone`, replacing any previous one.
    async fn issue(&self, phone: &PhoneIdentity) -> Result<String, IdentityError>;

    /// Consume the code if it matches and is live. A non-matching attempt
    /// leaves a live code in place.
    async fn verify(&self, phone: &PhoneIdentity, code: &str) -> Result<bool, IdentityError>;
}

/// Fixed-window attempt counter per identity.
pub trait AttemptLimiter: Send + Sync {
    /// Count an attempt and return `true` if it is within the limit. A denied
    /// attempt does not advance the counter.
    async fn admit(
        &self,
        phone: &PhoneIdentity,
        max_attempts: u32,
        window: Duration,
    ) -> Result<bool, IdentityError>;
}

/// Per-identity CSRF tokens, stable once created.
pub trait CsrfStore: Send + Sync {
    async fn token_for(&self, phone: &PhoneIdentity) -> Result<String, IdentityError>;

    async fn verify(&self, phone: &PhoneIdentity, token: &str) -> Result<bool, IdentityError>;
}

/// Outbound SMS. Delivery is best effort and never fails the caller.
pub trait Notifier: Send + Sync {
    /// Returns `true` if the provider accepted the message.
    async fn send(&self, phone: &PhoneIdentity, message: &str) -> bool;
}
