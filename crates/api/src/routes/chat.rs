//! Route definitions for the `/chat` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
///
/// ```text
/// POST   /mensaje             -> enviar_mensaje
/// GET    /historial           -> historial (?conversacion_id=)
/// GET    /conversaciones      -> list_conversaciones
/// POST   /conversaciones      -> create_conversacion
/// DELETE /conversaciones/{id} -> delete_conversacion
/// POST   /upload              -> upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mensaje", post(chat::enviar_mensaje))
        .route("/historial", get(chat::historial))
        .route(
            "/conversaciones",
            get(chat::list_conversaciones).post(chat::create_conversacion),
        )
        .route(
            "/conversaciones/{id}",
            axum::routing::delete(chat::delete_conversacion),
        )
        .route("/upload", post(chat::upload))
}
