//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::error::AppError;
use crate::state::AppState;
use crate::WebResult;
use axum::{Json, extract::State};
use serde::Serialize;

/// Health status body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `ready`
    pub status: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does NOT check dependencies.
///
/// ```text
/// GET /health  →  200 {"status": "ok"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check: pings the ticket store.
///
/// ```text
/// GET /ready  →  200 {"status": "ready"} | 503
/// ```
///
/// # Errors
///
/// 503 Service Unavailable if the store does not answer.
pub async fn readiness_check(State(state): State<AppState>) -> WebResult<Json<HealthResponse>> {
    state
        .lifecycle
        .check_store()
        .await
        .map_err(|e| AppError::unavailable("Ticket store unavailable").with_source(e.into()))?;

    Ok(Json(HealthResponse { status: "ready" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
    }
}
