use chrono::Utc;
use tracing::info;

use clubhouse_auth_types::session;
use clubhouse_domain::invite::normalize_invite_code;
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{InviteLedger, MemberDirectory, Notifier};
use crate::domain::types::{InviteCode, Member};
use crate::error::IdentityError;

// ── CheckInvite ──────────────────────────────────────────────────────────────

/// Pre-check shown before the registration form. Redemption re-checks
/// everything inside its own transaction.
pub struct CheckInviteUseCase<M, L>
where
    M: MemberDirectory,
    L: InviteLedger,
{
    pub members: M,
    pub invites: L,
    pub max_members: u64,
}

impl<M, L> CheckInviteUseCase<M, L>
where
    M: MemberDirectory,
    L: InviteLedger,
{
    pub async fn execute(&self, raw_code: &str) -> Result<InviteCode, IdentityError> {
        let code = normalize_invite_code(raw_code);
        if code.is_empty() {
            return Err(IdentityError::InvalidInviteCode);
        }
        let invite = self
            .invites
            .find_unused(&code)
            .await?
            .ok_or(IdentityError::InvalidInviteCode)?;
        if self.members.count().await? >= self.max_members {
            return Err(IdentityError::CommunityFull);
        }
        Ok(invite)
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub invite_code: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub member: Member,
    pub session_token: String,
}

pub struct RegisterUseCase<L, N>
where
    L: InviteLedger,
    N: Notifier,
{
    pub invites: L,
    pub notifier: N,
    pub admin_phones: Vec<PhoneIdentity>,
    pub max_members: u64,
    pub secret: String,
    pub site_name: String,
}

impl<L, N> RegisterUseCase<L, N>
where
    L: InviteLedger,
    N: Notifier,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, IdentityError> {
        let code = normalize_invite_code(&input.invite_code);
        let phone = PhoneIdentity::normalize(&input.phone);
        let name = input.name.trim();
        if phone.is_empty() || name.is_empty() {
            return Err(IdentityError::InvalidInput);
        }
        if code.is_empty() {
            return Err(IdentityError::InvalidInviteCode);
        }

        // The ledger assigns the handle under its lock.
        let candidate = Member {
            is_admin: self.admin_phones.contains(&phone),
            handle: None,
            phone,
            name: name.to_owned(),
            is_moderator: false,
            is_active: true,
            joined_at: Utc::now(),
        };

        // Marks the code used and inserts the member in one transaction
        let member = self
            .invites
            .redeem(&code, &candidate, self.max_members)
            .await?;
        info!(
            phone = %member.phone.masked(),
            code = %code,
            is_admin = member.is_admin,
            "member registered"
        );

        let welcome = format!("Welcome to {}, {}!", self.site_name, member.name);
        self.notifier.send(&member.phone, &welcome).await;

        let session_token = session::mint(&member.phone, &self.secret);
        Ok(RegisterOutput {
            member,
            session_token,
        })
    }
}
