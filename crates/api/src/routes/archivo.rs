//! Route definitions for the `/archivos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::archivo;
use crate::state::AppState;

/// Routes mounted at `/archivos`.
///
/// ```text
/// GET    /{id}/descargar -> descargar
/// DELETE /{id}           -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/descargar", get(archivo::descargar))
        .route("/{id}", axum::routing::delete(archivo::delete))
}
