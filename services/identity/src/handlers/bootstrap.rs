use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use clubhouse_auth_types::cookie::set_session_cookie;

use crate::error::IdentityError;
use crate::state::AppState;
use crate::usecase::bootstrap::{BootstrapInput, BootstrapStatusUseCase, BootstrapUseCase};

// ── GET /bootstrap ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct BootstrapStatusResponse {
    pub available: bool,
}

pub async fn bootstrap_status(
    State(state): State<AppState>,
) -> Result<Json<BootstrapStatusResponse>, IdentityError> {
    let usecase = BootstrapStatusUseCase {
        members: state.member_directory(),
    };
    let available = usecase.execute().await?;
    Ok(Json(BootstrapStatusResponse { available }))
}

// ── POST /bootstrap ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct BootstrapRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Serialize)]
pub struct BootstrapResponse {
    pub phone: String,
    pub handle: Option<String>,
    pub invite_codes: Vec<String>,
}

pub async fn bootstrap(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<BootstrapRequest>,
) -> Result<impl IntoResponse, IdentityError> {
    let usecase = BootstrapUseCase {
        members: state.member_directory(),
        secret: state.config.secret_salt.clone(),
    };

    let out = usecase
        .execute(BootstrapInput {
            name: body.name,
            phone: body.phone,
        })
        .await?;

    let jar = set_session_cookie(jar, out.session_token, state.secure_cookies());
    let body = BootstrapResponse {
        phone: out.admin.phone.format_for_display(),
        handle: out.admin.handle,
        invite_codes: out.invite_codes,
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}
