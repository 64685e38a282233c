//! Handlers for the `/notificaciones` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use thesia_core::error::CoreError;
use thesia_core::types::DbId;
use thesia_db::models::notificacion::Notificacion;
use thesia_db::repositories::NotificacionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::Envelope;
use crate::state::AppState;

/// Query parameters for `GET /notificaciones`.
#[derive(Debug, Deserialize)]
pub struct ListNotificacionesParams {
    #[serde(default)]
    pub solo_no_leidas: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Payload for the unread-count endpoint.
#[derive(Debug, Serialize)]
pub struct CantidadData {
    pub cantidad: i64,
}

/// GET /api/v1/notificaciones
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListNotificacionesParams>,
) -> AppResult<Json<Envelope<Vec<Notificacion>>>> {
    let notificaciones = NotificacionRepo::list_for_usuario(
        &state.pool,
        user.usuario_id,
        params.solo_no_leidas,
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(Envelope::data(notificaciones)))
}

/// POST /api/v1/notificaciones/{id}/leer
pub async fn marcar_leida(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Envelope<()>>> {
    let updated = NotificacionRepo::mark_read(&state.pool, id, user.usuario_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notificacion",
            id,
        }));
    }
    Ok(Json(Envelope::data(())))
}

/// POST /api/v1/notificaciones/leer-todas
pub async fn leer_todas(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Envelope<CantidadData>>> {
    let cantidad = NotificacionRepo::mark_all_read(&state.pool, user.usuario_id).await? as i64;
    Ok(Json(Envelope::data(CantidadData { cantidad })))
}

/// GET /api/v1/notificaciones/no-leidas/cantidad
pub async fn cantidad_no_leidas(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Envelope<CantidadData>>> {
    let cantidad = NotificacionRepo::unread_count(&state.pool, user.usuario_id).await?;
    Ok(Json(Envelope::data(CantidadData { cantidad })))
}
