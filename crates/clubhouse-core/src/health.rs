use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Handler for `GET /healthz`: liveness.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`: readiness.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// Body of a detailed health report: overall status, database check result,
/// and service-specific stats.
#[derive(Debug, Serialize)]
pub struct HealthReport<T: Serialize> {
    pub status: &'static str,
    pub database: String,
    pub stats: Option<T>,
    #[serde(serialize_with = "crate::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> HealthReport<T> {
    /// `ok` when the database check produced stats, `degraded` with the error text otherwise.
    pub fn from_check(check: Result<T, String>) -> Self {
        let timestamp = Utc::now();
        match check {
            Ok(stats) => Self {
                status: "ok",
                database: "ok".to_owned(),
                stats: Some(stats),
                timestamp,
            },
            Err(e) => Self {
                status: "degraded",
                database: format!("error: {e}"),
                stats: None,
                timestamp,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if self.status == "ok" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
