//! Route definitions for the `/canvas` streaming endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::canvas;
use crate::state::AppState;

/// Routes mounted at `/canvas`.
///
/// ```text
/// GET /generar-seccion-stream -> generar_seccion_stream (SSE, token query)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/generar-seccion-stream",
        get(canvas::generar_seccion_stream),
    )
}
