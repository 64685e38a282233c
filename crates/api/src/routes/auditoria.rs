//! Route definitions for the `/auditoria` resource (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::auditoria;
use crate::state::AppState;

/// Routes mounted at `/auditoria`.
///
/// ```text
/// GET / -> query
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(auditoria::query))
}
