use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use clubhouse_core::health::HealthReport;

use crate::domain::repository::MemberDirectory;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MembershipStats {
    pub members: u64,
    pub max_members: u64,
    pub ephemeral_store: &'static str,
}

async fn collect_stats(state: &AppState) -> Result<MembershipStats, String> {
    state.db.ping().await.map_err(|e| e.to_string())?;
    let members = state
        .member_directory()
        .count()
        .await
        .map_err(|e| format!("{e:#}"))?;
    Ok(MembershipStats {
        members,
        max_members: state.config.max_members,
        ephemeral_store: state.ephemeral.backend(),
    })
}

// ── GET /health ───────────────────────────────────────────────────────────────

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = HealthReport::from_check(collect_stats(&state).await);
    (report.status_code(), Json(report))
}
