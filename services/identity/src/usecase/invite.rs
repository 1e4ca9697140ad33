use anyhow::anyhow;
use chrono::Utc;
use tracing::{info, warn};

use clubhouse_domain::invite::generate_invite_code;
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{InviteLedger, MemberDirectory, Notifier};
use crate::domain::types::{InviteCode, MAX_INVITE_CODE_ATTEMPTS, Member, join_url};
use crate::error::IdentityError;

/// Draw codes until one is free, then persist it for `created_by`.
pub async fn create_unique_invite<L: InviteLedger>(
    invites: &L,
    created_by: &PhoneIdentity,
) -> Result<InviteCode, IdentityError> {
    for _ in 0..MAX_INVITE_CODE_ATTEMPTS {
        let code = generate_invite_code();
        if invites.exists(&code).await? {
            continue;
        }
        let invite = InviteCode::new(code, created_by.clone(), Utc::now());
        // `insert` loses to a concurrent writer of the same code by returning false.
        if invites.insert(&invite).await? {
            return Ok(invite);
        }
    }
    Err(anyhow!("no free invite code after {MAX_INVITE_CODE_ATTEMPTS} attempts").into())
}

// ── CreateInvite ─────────────────────────────────────────────────────────────

pub struct CreateInviteUseCase<L>
where
    L: InviteLedger,
{
    pub invites: L,
}

impl<L> CreateInviteUseCase<L>
where
    L: InviteLedger,
{
    pub async fn execute(&self, creator: &Member) -> Result<InviteCode, IdentityError> {
        let invite = create_unique_invite(&self.invites, &creator.phone).await?;
        info!(code = %invite.code, created_by = %creator.phone.masked(), "invite code created");
        Ok(invite)
    }
}

// ── SendInvite ───────────────────────────────────────────────────────────────

pub struct SendInviteInput {
    pub phone: String,
}

#[derive(Debug)]
pub struct SendInviteOutput {
    pub invite: InviteCode,
    pub recipient: PhoneIdentity,
    pub delivered: bool,
}

pub struct SendInviteUseCase<M, L, N>
where
    M: MemberDirectory,
    L: InviteLedger,
    N: Notifier,
{
    pub members: M,
    pub invites: L,
    pub notifier: N,
    pub site_name: String,
    pub site_url: Option<String>,
}

impl<M, L, N> SendInviteUseCase<M, L, N>
where
    M: MemberDirectory,
    L: InviteLedger,
    N: Notifier,
{
    pub async fn execute(
        &self,
        inviter: &Member,
        input: SendInviteInput,
    ) -> Result<SendInviteOutput, IdentityError> {
        let recipient = PhoneIdentity::normalize(&input.phone);
        if recipient.is_empty() {
            return Err(IdentityError::InvalidInput);
        }
        if self.members.find_by_identity(&recipient).await?.is_some() {
            return Err(IdentityError::AlreadyMember);
        }

        let invite = create_unique_invite(&self.invites, &inviter.phone).await?;
        let message = self.invite_message(&inviter.name, &invite.code);
        let delivered = self.notifier.send(&recipient, &message).await;
        if delivered {
            info!(code = %invite.code, to = %recipient.masked(), "invite sent");
        } else {
            // The code stays valid; the inviter can share it by hand.
            warn!(code = %invite.code, to = %recipient.masked(), "invite created but not delivered");
        }

        Ok(SendInviteOutput {
            invite,
            recipient,
            delivered,
        })
    }

    fn invite_message(&self, inviter_name: &str, code: &str) -> String {
        let site = &self.site_name;
        match self.site_url.as_deref() {
            Some(base) => format!(
                "{inviter_name} invited you to {site}!\n\nTap to join: {}\n\nYou'll enter your name and phone number to sign up.",
                join_url(Some(base), code)
            ),
            None => format!(
                "{inviter_name} invited you to {site}!\n\nYour invite code: {code}\n\nEnter it on the site with your phone number to join."
            ),
        }
    }
}
