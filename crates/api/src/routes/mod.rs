//! Route tree, one module per resource.

pub mod archivo;
pub mod auditoria;
pub mod auth;
pub mod canvas;
pub mod chat;
pub mod health;
pub mod notificacion;
pub mod proyecto;
pub mod usuario;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/registro                       student registration (public)
/// /auth/perfil                         current user (requires auth)
/// /auth/refresh                        refresh tokens (public)
/// /auth/logout                         logout (requires auth)
///
/// /proyectos                           list, create
/// /proyectos/estadisticas              per-state counts (role-scoped)
/// /proyectos/grafico                   monthly created/approved series
/// /proyectos/{id}                      get, update, delete
/// /proyectos/{id}/estado               lifecycle transition (PATCH)
/// /proyectos/{id}/asignar-tutor        assign tutor (PATCH, admin)
/// /proyectos/{id}/observaciones        list, append (tutor)
/// /proyectos/{id}/archivos             list, upload
///
/// /archivos/{id}/descargar             download stored bytes
/// /archivos/{id}                       delete (uploader or admin)
///
/// /usuarios                            list, create (admin)
/// /usuarios/tutores                    active tutor directory (any auth)
/// /usuarios/existe-email               email existence check (public)
/// /usuarios/{id}                       update, deactivate (admin)
///
/// /chat/mensaje                        send message, get assistant reply
/// /chat/historial                      conversation messages
/// /chat/conversaciones                 list, create
/// /chat/conversaciones/{id}            delete
/// /chat/upload                         attach a file to a conversation
///
/// /canvas/generar-seccion-stream       SSE section generation (token query)
///
/// /notificaciones                      list (?solo_no_leidas)
/// /notificaciones/leer-todas           mark all read (POST)
/// /notificaciones/no-leidas/cantidad   unread count (GET)
/// /notificaciones/{id}/leer            mark read (POST)
///
/// /auditoria                           audit log query (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/proyectos", proyecto::router())
        .nest("/archivos", archivo::router())
        .nest("/usuarios", usuario::router())
        .nest("/chat", chat::router())
        .nest("/canvas", canvas::router())
        .nest("/notificaciones", notificacion::router())
        .nest("/auditoria", auditoria::router())
}
