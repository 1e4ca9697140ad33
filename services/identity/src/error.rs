use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Identity service error variants.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid input")]
    InvalidInput,
    #[error("too many attempts, try again later")]
    RateLimited,
    #[error("member not found")]
    MemberNotFound,
    #[error("invalid login code")]
    InvalidLoginCode,
    #[error("invalid invite code")]
    InvalidInviteCode,
    #[error("invalid csrf token")]
    InvalidCsrfToken,
    #[error("not signed in")]
    Unauthenticated,
    #[error("admin access required")]
    Forbidden,
    #[error("admins cannot be demoted")]
    AdminNotDemotable,
    #[error("community is full")]
    CommunityFull,
    #[error("already a member")]
    AlreadyMember,
    #[error("already initialized")]
    AlreadyInitialized,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IdentityError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::RateLimited => "RATE_LIMITED",
            Self::MemberNotFound => "MEMBER_NOT_FOUND",
            Self::InvalidLoginCode => "INVALID_LOGIN_CODE",
            Self::InvalidInviteCode => "INVALID_INVITE_CODE",
            Self::InvalidCsrfToken => "INVALID_CSRF_TOKEN",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::AdminNotDemotable => "ADMIN_NOT_DEMOTABLE",
            Self::CommunityFull => "COMMUNITY_FULL",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput | Self::InvalidInviteCode => StatusCode::BAD_REQUEST,
            Self::InvalidLoginCode | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidCsrfToken | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::MemberNotFound => StatusCode::NOT_FOUND,
            Self::AdminNotDemotable
            | Self::CommunityFull
            | Self::AlreadyMember
            | Self::AlreadyInitialized => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records every response status; only 500s carry a
        // cause worth logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
