//! Liveness endpoint, mounted at the root (outside `/api/v1`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Routes mounted at `/`.
///
/// ```text
/// GET /health -> health
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Returns 200 with a database round-trip, 503 when the database is
/// unreachable.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match thesia_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unreachable" })),
            )
        }
    }
}
