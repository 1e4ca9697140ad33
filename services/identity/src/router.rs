use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use clubhouse_core::health::{healthz, readyz};
use clubhouse_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{demote_moderator, promote_moderator, set_view_mode},
    admission::{check_invite, check_invite_link, register},
    bootstrap::{bootstrap, bootstrap_status},
    health::health,
    invite::{create_invite, send_invite},
    login::{logout, request_code, verify_code},
    me::get_me,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/health", get(health))
        // Login
        .route("/auth/code", post(request_code))
        .route("/auth/verify", post(verify_code))
        .route("/auth/session", delete(logout))
        .route("/me", get(get_me))
        // First run
        .route("/bootstrap", get(bootstrap_status))
        .route("/bootstrap", post(bootstrap))
        // Admission
        .route("/join", post(check_invite))
        .route("/join/{code}", get(check_invite_link))
        .route("/register", post(register))
        // Invites
        .route("/invites", post(create_invite))
        .route("/invites/send", post(send_invite))
        // Admin
        .route("/admin/moderators/{phone}", post(promote_moderator))
        .route("/admin/moderators/{phone}", delete(demote_moderator))
        .route("/admin/view-mode", put(set_view_mode))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
