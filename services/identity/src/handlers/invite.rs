use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::handlers::extract::CsrfProtected;
use crate::state::AppState;
use crate::usecase::invite::{CreateInviteUseCase, SendInviteInput, SendInviteUseCase};

#[derive(Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub join_url: String,
}

// ── POST /invites ─────────────────────────────────────────────────────────────

pub async fn create_invite(
    State(state): State<AppState>,
    CsrfProtected(member): CsrfProtected,
) -> Result<impl IntoResponse, IdentityError> {
    let usecase = CreateInviteUseCase {
        invites: state.invite_ledger(),
    };
    let invite = usecase.execute(&member).await?;
    let body = InviteResponse {
        join_url: state.config.join_url(&invite.code),
        code: invite.code,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// ── POST /invites/send ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendInviteRequest {
    pub phone: String,
}

#[derive(Serialize)]
pub struct SendInviteResponse {
    pub code: String,
    pub join_url: String,
    pub phone: String,
    pub delivered: bool,
}

pub async fn send_invite(
    State(state): State<AppState>,
    CsrfProtected(member): CsrfProtected,
    Json(body): Json<SendInviteRequest>,
) -> Result<impl IntoResponse, IdentityError> {
    let usecase = SendInviteUseCase {
        members: state.member_directory(),
        invites: state.invite_ledger(),
        notifier: state.notifier.clone(),
        site_name: state.config.site_name.clone(),
        site_url: state.config.site_url.clone(),
    };
    let out = usecase
        .execute(&member, SendInviteInput { phone: body.phone })
        .await?;
    let body = SendInviteResponse {
        join_url: state.config.join_url(&out.invite.code),
        code: out.invite.code,
        phone: out.recipient.format_for_display(),
        delivered: out.delivered,
    };
    Ok((StatusCode::CREATED, Json(body)))
}
