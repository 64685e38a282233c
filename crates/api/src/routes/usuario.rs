//! Route definitions for the `/usuarios` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::usuario;
use crate::state::AppState;

/// Routes mounted at `/usuarios`.
///
/// ```text
/// GET    /              -> list (admin)
/// POST   /              -> create (admin)
/// GET    /tutores       -> list_tutores (any authenticated user)
/// GET    /existe-email  -> existe_email (public)
/// PUT    /{id}          -> update (admin)
/// DELETE /{id}          -> delete (admin, soft-deactivation)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(usuario::list).post(usuario::create))
        .route("/tutores", get(usuario::list_tutores))
        .route("/existe-email", get(usuario::existe_email))
        .route(
            "/{id}",
            axum::routing::put(usuario::update).delete(usuario::delete),
        )
}
