//! Route definitions for the `/proyectos` resource.
//!
//! Also nests observation and file routes under `/proyectos/{id}/...`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{archivo, observacion, proyecto};
use crate::state::AppState;

/// Routes mounted at `/proyectos`.
///
/// ```text
/// GET    /                     -> list (role-scoped)
/// POST   /                     -> create (student)
/// GET    /estadisticas         -> estadisticas
/// GET    /grafico              -> grafico
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update (owning student)
/// DELETE /{id}                 -> delete
/// PATCH  /{id}/estado          -> cambiar_estado
/// PATCH  /{id}/asignar-tutor   -> asignar_tutor (admin)
/// GET    /{id}/observaciones   -> observacion::list
/// POST   /{id}/observaciones   -> observacion::create (assigned tutor)
/// GET    /{id}/archivos        -> archivo::list
/// POST   /{id}/archivos        -> archivo::upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(proyecto::list).post(proyecto::create))
        .route("/estadisticas", get(proyecto::estadisticas))
        .route("/grafico", get(proyecto::grafico))
        .route(
            "/{id}",
            get(proyecto::get_by_id)
                .put(proyecto::update)
                .delete(proyecto::delete),
        )
        .route("/{id}/estado", patch(proyecto::cambiar_estado))
        .route("/{id}/asignar-tutor", patch(proyecto::asignar_tutor))
        .route(
            "/{id}/observaciones",
            get(observacion::list).post(observacion::create),
        )
        .route("/{id}/archivos", get(archivo::list).post(archivo::upload))
}
