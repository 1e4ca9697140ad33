use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use clubhouse_auth_types::session;
use clubhouse_domain::invite::generate_invite_code;
use clubhouse_domain::member::handle_base;
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::MemberDirectory;
use crate::domain::types::{BOOTSTRAP_INVITE_COUNT, InviteCode, Member};
use crate::error::IdentityError;

// ── BootstrapStatus ──────────────────────────────────────────────────────────

pub struct BootstrapStatusUseCase<M>
where
    M: MemberDirectory,
{
    pub members: M,
}

impl<M> BootstrapStatusUseCase<M>
where
    M: MemberDirectory,
{
    /// `true` while the directory is empty.
    pub async fn execute(&self) -> Result<bool, IdentityError> {
        Ok(self.members.count().await? == 0)
    }
}

// ── Bootstrap ────────────────────────────────────────────────────────────────

pub struct BootstrapInput {
    pub name: String,
    pub phone: String,
}

#[derive(Debug)]
pub struct BootstrapOutput {
    pub admin: Member,
    pub invite_codes: Vec<String>,
    pub session_token: String,
}

pub struct BootstrapUseCase<M>
where
    M: MemberDirectory,
{
    pub members: M,
    pub secret: String,
}

impl<M> BootstrapUseCase<M>
where
    M: MemberDirectory,
{
    pub async fn execute(&self, input: BootstrapInput) -> Result<BootstrapOutput, IdentityError> {
        let phone = PhoneIdentity::normalize(&input.phone);
        let name = input.name.trim();
        if phone.is_empty() || name.is_empty() {
            return Err(IdentityError::InvalidInput);
        }

        // Cheap early answer; the directory re-checks under lock.
        if self.members.count().await? > 0 {
            return Err(IdentityError::AlreadyInitialized);
        }

        let now = Utc::now();
        let admin = Member {
            phone: phone.clone(),
            name: name.to_owned(),
            handle: Some(handle_base(name)),
            is_admin: true,
            is_moderator: false,
            is_active: true,
            joined_at: now,
        };

        let mut codes = BTreeSet::new();
        while codes.len() < BOOTSTRAP_INVITE_COUNT {
            codes.insert(generate_invite_code());
        }
        let invites: Vec<InviteCode> = codes
            .into_iter()
            .map(|code| InviteCode::new(code, phone.clone(), now))
            .collect();

        self.members.insert_first_admin(&admin, &invites).await?;
        info!(phone = %phone.masked(), "first admin bootstrapped");

        Ok(BootstrapOutput {
            session_token: session::mint(&phone, &self.secret),
            invite_codes: invites.into_iter().map(|i| i.code).collect(),
            admin,
        })
    }
}
