use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use clubhouse_auth_types::cookie::{
    clear_session_cookie, clear_view_as_member_cookie, set_session_cookie,
};

use crate::error::IdentityError;
use crate::state::AppState;
use crate::usecase::login::{
    LoginPolicy, RequestLoginCodeInput, RequestLoginCodeUseCase, VerifyLoginCodeInput,
    VerifyLoginCodeUseCase,
};

// ── POST /auth/code ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestCodeRequest {
    pub phone: String,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    pub phone: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeRequest>,
) -> Result<impl IntoResponse, IdentityError> {
    let config = &state.config;
    let usecase = RequestLoginCodeUseCase {
        members: state.member_directory(),
        limiter: state.ephemeral.clone(),
        challenges: state.ephemeral.clone(),
        notifier: state.notifier.clone(),
        policy: LoginPolicy {
            max_attempts: config.login_rate_limit_max,
            window: Duration::seconds(config.login_rate_limit_window_secs),
            site_name: config.site_name.clone(),
            echo_code: !config.production_mode,
        },
    };

    let out = usecase
        .execute(RequestLoginCodeInput { phone: body.phone })
        .await?;

    let body = RequestCodeResponse {
        phone: out.phone.format_for_display(),
        delivered: out.delivered,
        code: out.code,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// ── POST /auth/verify ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub phone: String,
}

pub async fn verify_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse, IdentityError> {
    let usecase = VerifyLoginCodeUseCase {
        challenges: state.ephemeral.clone(),
        secret: state.config.secret_salt.clone(),
    };

    let out = usecase
        .execute(VerifyLoginCodeInput {
            phone: body.phone,
            code: body.code,
        })
        .await?;

    let jar = set_session_cookie(jar, out.session_token, state.secure_cookies());
    let body = SessionResponse {
        phone: out.phone.format_for_display(),
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── DELETE /auth/session ──────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_session_cookie(jar, state.secure_cookies());
    let jar = clear_view_as_member_cookie(jar);
    (StatusCode::NO_CONTENT, jar)
}
