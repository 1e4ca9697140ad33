use tracing::info;

use clubhouse_domain::member::MemberRole;
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{MemberDirectory, Notifier};
use crate::domain::types::Member;
use crate::error::IdentityError;

pub fn require_admin(member: &Member) -> Result<(), IdentityError> {
    if member.role() == MemberRole::Admin {
        Ok(())
    } else {
        Err(IdentityError::Forbidden)
    }
}

async fn resolve_admin<M: MemberDirectory>(
    members: &M,
    actor: &PhoneIdentity,
) -> Result<Member, IdentityError> {
    let actor = members
        .find_by_identity(actor)
        .await?
        .ok_or(IdentityError::Forbidden)?;
    require_admin(&actor)?;
    Ok(actor)
}

async fn resolve_target<M: MemberDirectory>(
    members: &M,
    raw_target: &str,
) -> Result<Member, IdentityError> {
    let target = PhoneIdentity::normalize(raw_target);
    members
        .find_by_identity(&target)
        .await?
        .ok_or(IdentityError::MemberNotFound)
}

// ── PromoteModerator ─────────────────────────────────────────────────────────

pub struct PromoteModeratorUseCase<M, N>
where
    M: MemberDirectory,
    N: Notifier,
{
    pub members: M,
    pub notifier: N,
    pub site_name: String,
}

impl<M, N> PromoteModeratorUseCase<M, N>
where
    M: MemberDirectory,
    N: Notifier,
{
    /// Returns the target as it stands afterwards. Admins and existing
    /// moderators are left as they are.
    pub async fn execute(
        &self,
        actor: &PhoneIdentity,
        raw_target: &str,
    ) -> Result<Member, IdentityError> {
        let actor = resolve_admin(&self.members, actor).await?;
        let target = resolve_target(&self.members, raw_target).await?;
        if target.is_admin || target.is_moderator {
            return Ok(target);
        }

        self.members
            .update_role(&target.phone, None, Some(true))
            .await?;
        info!(
            target = %target.phone.masked(),
            by = %actor.phone.masked(),
            "member promoted to moderator"
        );

        let message = format!(
            "Hey {}! You've been promoted to Moderator in {}. You can now pin posts and help manage the community.",
            target.name, self.site_name
        );
        self.notifier.send(&target.phone, &message).await;

        Ok(Member {
            is_moderator: true,
            ..target
        })
    }
}

// ── DemoteModerator ──────────────────────────────────────────────────────────

pub struct DemoteModeratorUseCase<M>
where
    M: MemberDirectory,
{
    pub members: M,
}

impl<M> DemoteModeratorUseCase<M>
where
    M: MemberDirectory,
{
    pub async fn execute(
        &self,
        actor: &PhoneIdentity,
        raw_target: &str,
    ) -> Result<Member, IdentityError> {
        let actor = resolve_admin(&self.members, actor).await?;
        let target = resolve_target(&self.members, raw_target).await?;
        // Admin is assigned outside this flow and never removed by it
        if target.is_admin {
            return Err(IdentityError::AdminNotDemotable);
        }
        if !target.is_moderator {
            return Ok(target);
        }

        self.members
            .update_role(&target.phone, None, Some(false))
            .await?;
        info!(
            target = %target.phone.masked(),
            by = %actor.phone.masked(),
            "moderator demoted"
        );
        Ok(Member {
            is_moderator: false,
            ..target
        })
    }
}
