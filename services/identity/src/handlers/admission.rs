use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use clubhouse_auth_types::cookie::set_session_cookie;

use crate::error::IdentityError;
use crate::state::AppState;
use crate::usecase::admission::{CheckInviteUseCase, RegisterInput, RegisterUseCase};

#[derive(Serialize)]
pub struct InviteCheckResponse {
    pub code: String,
    pub valid: bool,
}

async fn check(state: &AppState, raw_code: &str) -> Result<Json<InviteCheckResponse>, IdentityError> {
    let usecase = CheckInviteUseCase {
        members: state.member_directory(),
        invites: state.invite_ledger(),
        max_members: state.config.max_members,
    };
    let invite = usecase.execute(raw_code).await?;
    Ok(Json(InviteCheckResponse {
        code: invite.code,
        valid: true,
    }))
}

// ── GET /join/{code} ──────────────────────────────────────────────────────────

pub async fn check_invite_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InviteCheckResponse>, IdentityError> {
    check(&state, &code).await
}

// ── POST /join ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckInviteRequest {
    pub invite_code: String,
}

pub async fn check_invite(
    State(state): State<AppState>,
    Json(body): Json<CheckInviteRequest>,
) -> Result<Json<InviteCheckResponse>, IdentityError> {
    check(&state, &body.invite_code).await
}

// ── POST /register ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub invite_code: String,
    pub name: String,
    pub phone: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub phone: String,
    pub name: String,
    pub handle: Option<String>,
    pub is_admin: bool,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, IdentityError> {
    let config = &state.config;
    let usecase = RegisterUseCase {
        invites: state.invite_ledger(),
        notifier: state.notifier.clone(),
        admin_phones: config.admin_phones.clone(),
        max_members: config.max_members,
        secret: config.secret_salt.clone(),
        site_name: config.site_name.clone(),
    };

    let out = usecase
        .execute(RegisterInput {
            invite_code: body.invite_code,
            name: body.name,
            phone: body.phone,
        })
        .await?;

    let jar = set_session_cookie(jar, out.session_token, state.secure_cookies());
    let body = RegisterResponse {
        phone: out.member.phone.format_for_display(),
        name: out.member.name,
        handle: out.member.handle,
        is_admin: out.member.is_admin,
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}
