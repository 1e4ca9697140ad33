//! Session extractors that re-check the directory on every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use clubhouse_auth_types::csrf::CSRF_HEADER;
use clubhouse_auth_types::identity::{SessionSecret, identity_from_headers};

use crate::domain::types::Member;
use crate::error::IdentityError;
use crate::infra::db::DbMemberDirectory;
use crate::infra::ephemeral::EphemeralStores;
use crate::state::AppState;
use crate::usecase::session::AuthenticateUseCase;

pub fn authenticate(state: &AppState) -> AuthenticateUseCase<DbMemberDirectory, EphemeralStores> {
    AuthenticateUseCase {
        members: state.member_directory(),
        csrf: state.ephemeral.clone(),
    }
}

/// The signed-in member. 401 if the cookie is missing, forged, or names
/// someone no longer in the directory.
#[derive(Debug, Clone)]
pub struct CurrentMember(pub Member);

impl FromRequestParts<AppState> for CurrentMember {
    type Rejection = IdentityError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = identity_from_headers(&parts.headers, state.session_secret());
        let state = state.clone();

        async move {
            let phone = identity.ok_or(IdentityError::Unauthenticated)?;
            let member = authenticate(&state).current_member(&phone).await?;
            Ok(Self(member))
        }
    }
}

/// A signed-in member whose request carries their CSRF token in
/// `x-csrf-token`. Required on every state-changing member endpoint.
#[derive(Debug, Clone)]
pub struct CsrfProtected(pub Member);

impl FromRequestParts<AppState> for CsrfProtected {
    type Rejection = IdentityError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = identity_from_headers(&parts.headers, state.session_secret());
        let submitted = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let state = state.clone();

        async move {
            let phone = identity.ok_or(IdentityError::Unauthenticated)?;
            let member = authenticate(&state)
                .authorize_write(&phone, submitted.as_deref())
                .await?;
            Ok(Self(member))
        }
    }
}
