use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use clubhouse_auth_types::cookie::{clear_view_as_member_cookie, set_view_as_member_cookie};
use clubhouse_domain::member::MemberRole;

use crate::domain::types::Member;
use crate::error::IdentityError;
use crate::handlers::extract::CsrfProtected;
use crate::state::AppState;
use crate::usecase::role::{DemoteModeratorUseCase, PromoteModeratorUseCase, require_admin};

#[derive(Serialize)]
pub struct RoleResponse {
    pub phone: String,
    pub role: MemberRole,
}

impl From<Member> for RoleResponse {
    fn from(member: Member) -> Self {
        Self {
            role: member.role(),
            phone: member.phone.format_for_display(),
        }
    }
}

// ── POST /admin/moderators/{phone} ────────────────────────────────────────────

pub async fn promote_moderator(
    State(state): State<AppState>,
    CsrfProtected(actor): CsrfProtected,
    Path(phone): Path<String>,
) -> Result<Json<RoleResponse>, IdentityError> {
    let usecase = PromoteModeratorUseCase {
        members: state.member_directory(),
        notifier: state.notifier.clone(),
        site_name: state.config.site_name.clone(),
    };
    let target = usecase.execute(&actor.phone, &phone).await?;
    Ok(Json(target.into()))
}

// ── DELETE /admin/moderators/{phone} ──────────────────────────────────────────

pub async fn demote_moderator(
    State(state): State<AppState>,
    CsrfProtected(actor): CsrfProtected,
    Path(phone): Path<String>,
) -> Result<Json<RoleResponse>, IdentityError> {
    let usecase = DemoteModeratorUseCase {
        members: state.member_directory(),
    };
    let target = usecase.execute(&actor.phone, &phone).await?;
    Ok(Json(target.into()))
}

// ── PUT /admin/view-mode ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ViewModeRequest {
    pub as_member: bool,
}

pub async fn set_view_mode(
    CsrfProtected(actor): CsrfProtected,
    jar: CookieJar,
    Json(body): Json<ViewModeRequest>,
) -> Result<impl IntoResponse, IdentityError> {
    require_admin(&actor)?;
    let jar = if body.as_member {
        set_view_as_member_cookie(jar)
    } else {
        clear_view_as_member_cookie(jar)
    };
    Ok((StatusCode::NO_CONTENT, jar))
}
