use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;

use clubhouse_auth_types::cookie::is_viewing_as_member;
use clubhouse_domain::member::MemberRole;

use crate::domain::repository::CsrfStore;
use crate::error::IdentityError;
use crate::handlers::extract::CurrentMember;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MeResponse {
    pub phone: String,
    pub display_phone: String,
    pub name: String,
    pub handle: Option<String>,
    pub role: MemberRole,
    /// Role the UI should render. Differs from `role` only for an admin
    /// previewing the member view; never used for authorization.
    pub effective_role: MemberRole,
    pub csrf_token: String,
    #[serde(serialize_with = "clubhouse_core::serde::to_rfc3339_ms")]
    pub joined_at: DateTime<Utc>,
}

// ── GET /me ───────────────────────────────────────────────────────────────────

pub async fn get_me(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    jar: CookieJar,
) -> Result<Json<MeResponse>, IdentityError> {
    let csrf_token = state.ephemeral.token_for(&member.phone).await?;
    let role = member.role();
    let effective_role = if role == MemberRole::Admin && is_viewing_as_member(&jar) {
        MemberRole::Member
    } else {
        role
    };

    Ok(Json(MeResponse {
        display_phone: member.phone.format_for_display(),
        phone: member.phone.into_inner(),
        name: member.name,
        handle: member.handle,
        role,
        effective_role,
        csrf_token,
        joined_at: member.joined_at,
    }))
}
