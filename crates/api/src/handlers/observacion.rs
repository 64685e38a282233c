//! Handlers for project observations.
//!
//! Observations created here are follow-up notes outside a lifecycle
//! transition; transition-attached observations are written atomically by
//! the estado endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thesia_core::error::CoreError;
use thesia_core::lifecycle::ESTADO_BORRADOR;
use thesia_core::observation::validate_observacion;
use thesia_core::types::DbId;
use thesia_db::models::observacion::Observacion;
use thesia_db::repositories::{ObservacionRepo, ProyectoRepo};
use thesia_events::bus::{DomainEvent, EVENTO_OBSERVACION_CREADA};

use crate::error::{AppError, AppResult};
use crate::handlers::proyecto::{cargar_proyecto_visible, es_tutor_asignado};
use crate::handlers::registrar_auditoria;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTutor;
use crate::response::Envelope;
use crate::state::AppState;

/// Request body for `POST /proyectos/{id}/observaciones`.
#[derive(Debug, Deserialize)]
pub struct CreateObservacionRequest {
    pub observacion: String,
}

/// GET /api/v1/proyectos/{id}/observaciones
///
/// Observations are listed oldest first, the order they were written in.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(proyecto_id): Path<DbId>,
) -> AppResult<Json<Envelope<Vec<Observacion>>>> {
    cargar_proyecto_visible(&state, proyecto_id, &user).await?;
    let observaciones = ObservacionRepo::list_by_proyecto(&state.pool, proyecto_id).await?;
    Ok(Json(Envelope::data(observaciones)))
}

/// POST /api/v1/proyectos/{id}/observaciones
///
/// The assigned tutor appends a follow-up note without changing the
/// project's state. Drafts have no review conversation yet, so they take
/// no observations.
pub async fn create(
    State(state): State<AppState>,
    RequireTutor(user): RequireTutor,
    Path(proyecto_id): Path<DbId>,
    Json(input): Json<CreateObservacionRequest>,
) -> AppResult<(StatusCode, Json<Envelope<Observacion>>)> {
    let proyecto = ProyectoRepo::find_by_id(&state.pool, proyecto_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id: proyecto_id,
        }))?;

    if !es_tutor_asignado(&proyecto, &user) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the assigned tutor may add observations".into(),
        )));
    }
    if proyecto.estado == ESTADO_BORRADOR {
        return Err(AppError::Core(CoreError::Conflict(
            "Draft projects do not take observations".into(),
        )));
    }

    let texto = input.observacion.trim();
    validate_observacion(texto)?;

    let observacion = ObservacionRepo::create(
        &state.pool,
        proyecto_id,
        user.usuario_id,
        texto,
        &proyecto.estado,
    )
    .await?;

    state.event_bus.publish(
        DomainEvent::new(EVENTO_OBSERVACION_CREADA)
            .with_proyecto(proyecto_id)
            .with_actor(user.usuario_id),
    );

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "observacion.crear",
        "observacion",
        Some(observacion.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(Envelope::data(observacion))))
}
