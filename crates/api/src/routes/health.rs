//! Root-level `/health` probe for load balancers and operators.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use cda_db::repositories::LockCensus;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when both the database and the lock tables answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Lock table counts, absent when the lock tables cannot be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locks: Option<LockCensus>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = cda_db::health_check(&state.pool).await.is_ok();
    let locks = match state.locks.store().census().await {
        Ok(census) => Some(census),
        Err(err) => {
            tracing::warn!(error = %err, "Lock tables unreadable");
            None
        }
    };

    let status = if db_healthy && locks.is_some() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        locks,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
