use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{CsrfStore, MemberDirectory};
use crate::domain::types::Member;
use crate::error::IdentityError;

/// Resolves a verified session identity to a live member and guards writes.
///
/// A valid token only proves the server once minted it, so every request
/// goes back to the directory.
pub struct AuthenticateUseCase<M, X>
where
    M: MemberDirectory,
    X: CsrfStore,
{
    pub members: M,
    pub csrf: X,
}

impl<M, X> AuthenticateUseCase<M, X>
where
    M: MemberDirectory,
    X: CsrfStore,
{
    pub async fn current_member(&self, phone: &PhoneIdentity) -> Result<Member, IdentityError> {
        self.members
            .find_by_identity(phone)
            .await?
            .ok_or(IdentityError::Unauthenticated)
    }

    /// Require both a live member and a matching CSRF token.
    pub async fn authorize_write(
        &self,
        phone: &PhoneIdentity,
        submitted: Option<&str>,
    ) -> Result<Member, IdentityError> {
        let member = self.current_member(phone).await?;
        let token = submitted.ok_or(IdentityError::InvalidCsrfToken)?;
        if !self.csrf.verify(phone, token).await? {
            return Err(IdentityError::InvalidCsrfToken);
        }
        Ok(member)
    }
}
