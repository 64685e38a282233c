//! Route definitions for the `/notificaciones` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notificacion;
use crate::state::AppState;

/// Routes mounted at `/notificaciones`.
///
/// ```text
/// GET  /                    -> list (?solo_no_leidas, limit, offset)
/// POST /leer-todas          -> leer_todas
/// GET  /no-leidas/cantidad  -> cantidad_no_leidas
/// POST /{id}/leer           -> marcar_leida
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notificacion::list))
        .route("/leer-todas", post(notificacion::leer_todas))
        .route("/no-leidas/cantidad", get(notificacion::cantidad_no_leidas))
        .route("/{id}/leer", post(notificacion::marcar_leida))
}
