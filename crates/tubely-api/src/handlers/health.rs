//! Health check handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe - process is running.
#[utoipa::path(
    get,
    path = "/api/healthz",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the metadata store answers.
#[utoipa::path(
    get,
    path = "/api/readyz",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Error text stays in the logs; this endpoint is unauthenticated.
    let database = match tokio::time::timeout(READINESS_TIMEOUT, state.videos.ping()).await {
        Ok(Ok(())) => "healthy",
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness check failed: database ping error");
            "unhealthy"
        }
        Err(_) => {
            tracing::warn!(timeout_secs = READINESS_TIMEOUT.as_secs(), "Readiness check timed out");
            "timeout"
        }
    };

    let status = if database == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status == StatusCode::OK { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}
