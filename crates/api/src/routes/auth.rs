//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login     -> login
/// POST /registro  -> registro
/// GET  /perfil    -> perfil (requires auth)
/// POST /refresh   -> refresh
/// POST /logout    -> logout (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/registro", post(auth::registro))
        .route("/perfil", get(auth::perfil))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
