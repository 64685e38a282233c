//! Handlers for the `/proyectos` resource: CRUD, lifecycle transitions,
//! tutor assignment, and aggregate statistics.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use thesia_core::error::CoreError;
use thesia_core::lifecycle::{self, Actor, TransitionPlan};
use thesia_core::proposal::{validate_descripcion, validate_titulo};
use thesia_core::roles::{ROL_ADMINISTRADOR, ROL_ESTUDIANTE, ROL_TUTOR};
use thesia_core::types::DbId;
use thesia_db::models::observacion::NuevaObservacion;
use thesia_db::models::proyecto::{
    CreateProyecto, EstadoCount, Proyecto, PuntoMensual, TransitionOutcome, UpdateProyecto,
};
use thesia_db::repositories::{ProyectoRepo, UsuarioRepo};
use thesia_events::bus::{
    DomainEvent, EVENTO_PROYECTO_APROBADO, EVENTO_PROYECTO_CORREGIR, EVENTO_PROYECTO_ENVIADO,
    EVENTO_PROYECTO_EN_REVISION, EVENTO_PROYECTO_RECHAZADO, EVENTO_TUTOR_ASIGNADO,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::registrar_auditoria;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireEstudiante};
use crate::query::PaginationParams;
use crate::response::Envelope;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Access helpers (shared with observation and file handlers)
// ---------------------------------------------------------------------------

/// Whether the user owns this project as its student.
pub(crate) fn es_propietario(proyecto: &Proyecto, user: &AuthUser) -> bool {
    user.rol == ROL_ESTUDIANTE && proyecto.estudiante_id == user.usuario_id
}

/// Whether the user is the tutor assigned to this project.
pub(crate) fn es_tutor_asignado(proyecto: &Proyecto, user: &AuthUser) -> bool {
    user.rol == ROL_TUTOR && proyecto.tutor_id == Some(user.usuario_id)
}

/// Read access: owner, assigned tutor, or administrator.
pub(crate) fn puede_ver(proyecto: &Proyecto, user: &AuthUser) -> bool {
    user.rol == ROL_ADMINISTRADOR || es_propietario(proyecto, user) || es_tutor_asignado(proyecto, user)
}

/// Fetch a project and enforce read access.
pub(crate) async fn cargar_proyecto_visible(
    state: &AppState,
    id: DbId,
    user: &AuthUser,
) -> AppResult<Proyecto> {
    let proyecto = ProyectoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id,
        }))?;
    if !puede_ver(&proyecto, user) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this project".into(),
        )));
    }
    Ok(proyecto)
}

/// List scope for the authenticated user's role: students see their own
/// projects, tutors their assigned ones, administrators everything.
fn list_scope(user: &AuthUser) -> (Option<DbId>, Option<DbId>) {
    if user.rol == ROL_ESTUDIANTE {
        (Some(user.usuario_id), None)
    } else if user.rol == ROL_TUTOR {
        (None, Some(user.usuario_id))
    } else {
        (None, None)
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PATCH /proyectos/{id}/estado`.
#[derive(Debug, Deserialize)]
pub struct CambiarEstadoRequest {
    pub estado: String,
    pub observacion: Option<String>,
}

/// Request body for `PATCH /proyectos/{id}/asignar-tutor`.
/// `tutor_id: null` clears the assignment.
#[derive(Debug, Deserialize)]
pub struct AsignarTutorRequest {
    pub tutor_id: Option<DbId>,
}

/// Request body for `POST /proyectos` with field-level validation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProyectoRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub titulo: String,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub descripcion: String,
    pub planteamiento: Option<String>,
    pub solucion_problema: Option<String>,
    pub objetivo_general: Option<String>,
    pub objetivos_especificos: Option<String>,
    pub metodologia: Option<String>,
}

/// Aggregate statistics payload for `GET /proyectos/estadisticas`.
#[derive(Debug, Serialize)]
pub struct Estadisticas {
    pub total: i64,
    pub por_estado: Vec<EstadoCount>,
}

// ---------------------------------------------------------------------------
// CRUD handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/proyectos
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Envelope<Vec<Proyecto>>>> {
    let (estudiante_id, tutor_id) = list_scope(&user);
    let proyectos =
        ProyectoRepo::list(&state.pool, estudiante_id, tutor_id, params.limit, params.offset)
            .await?;
    Ok(Json(Envelope::data(proyectos)))
}

/// POST /api/v1/proyectos
///
/// Students create proposals; they always start in `borrador`.
pub async fn create(
    State(state): State<AppState>,
    RequireEstudiante(user): RequireEstudiante,
    Json(input): Json<CreateProyectoRequest>,
) -> AppResult<(StatusCode, Json<Envelope<Proyecto>>)> {
    input.validate().map_err(AppError::from_validator)?;
    validate_titulo(&input.titulo)?;
    validate_descripcion(&input.descripcion)?;

    let proyecto = ProyectoRepo::create(
        &state.pool,
        user.usuario_id,
        &CreateProyecto {
            titulo: input.titulo,
            descripcion: input.descripcion,
            planteamiento: input.planteamiento,
            solucion_problema: input.solucion_problema,
            objetivo_general: input.objetivo_general,
            objetivos_especificos: input.objetivos_especificos,
            metodologia: input.metodologia,
        },
    )
    .await?;

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "proyecto.crear",
        "proyecto",
        Some(proyecto.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(Envelope::data(proyecto))))
}

/// GET /api/v1/proyectos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Envelope<Proyecto>>> {
    let proyecto = cargar_proyecto_visible(&state, id, &user).await?;
    Ok(Json(Envelope::data(proyecto)))
}

/// PUT /api/v1/proyectos/{id}
///
/// Only the owning student may edit content, and only while the project is
/// in an editable state (`borrador` or `corregir`). Every applied edit
/// bumps `version`.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProyecto>,
) -> AppResult<Json<Envelope<Proyecto>>> {
    let proyecto = ProyectoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id,
        }))?;

    if !es_propietario(&proyecto, &user) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owning student may edit this project".into(),
        )));
    }
    if !lifecycle::es_editable(&proyecto.estado) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A project in state '{}' cannot be edited",
            proyecto.estado
        ))));
    }

    if let Some(titulo) = &input.titulo {
        validate_titulo(titulo)?;
    }
    if let Some(descripcion) = &input.descripcion {
        validate_descripcion(descripcion)?;
    }

    let actualizado = ProyectoRepo::update_content(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id,
        }))?;

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "proyecto.actualizar",
        "proyecto",
        Some(id),
        Some(serde_json::json!({ "version": actualizado.version })),
    )
    .await;

    Ok(Json(Envelope::data(actualizado)))
}

/// DELETE /api/v1/proyectos/{id}
///
/// The owning student may delete drafts; administrators may delete any
/// project.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let proyecto = ProyectoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id,
        }))?;

    let es_admin = user.rol == ROL_ADMINISTRADOR;
    if !es_admin {
        if !es_propietario(&proyecto, &user) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only the owning student or an administrator may delete this project".into(),
            )));
        }
        if proyecto.estado != lifecycle::ESTADO_BORRADOR {
            return Err(AppError::Core(CoreError::Conflict(
                "Only draft projects can be deleted".into(),
            )));
        }
    }

    ProyectoRepo::delete(&state.pool, id).await?;

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "proyecto.eliminar",
        "proyecto",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Domain event published for a transition's target state.
fn evento_para(plan: &TransitionPlan) -> Option<&'static str> {
    match plan.to {
        lifecycle::ESTADO_ENVIADO => Some(EVENTO_PROYECTO_ENVIADO),
        lifecycle::ESTADO_EN_REVISION => Some(EVENTO_PROYECTO_EN_REVISION),
        lifecycle::ESTADO_APROBADO => Some(EVENTO_PROYECTO_APROBADO),
        lifecycle::ESTADO_RECHAZADO => Some(EVENTO_PROYECTO_RECHAZADO),
        lifecycle::ESTADO_CORREGIR => Some(EVENTO_PROYECTO_CORREGIR),
        _ => None,
    }
}

/// PATCH /api/v1/proyectos/{id}/estado
///
/// Role-gated lifecycle transition. The request names the target state;
/// the lifecycle table decides who may perform it and whether the attached
/// observation is required, optional, or rejected. Observation insert and
/// state write are atomic.
pub async fn cambiar_estado(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CambiarEstadoRequest>,
) -> AppResult<Json<Envelope<Proyecto>>> {
    let proyecto = ProyectoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id,
        }))?;

    // Plan first: an impossible transition fails before any authorization
    // detail leaks.
    let plan = lifecycle::plan_transition(&proyecto.estado, &input.estado)?;

    match plan.actor {
        Actor::OwningStudent => {
            if !es_propietario(&proyecto, &user) {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only the owning student may perform this transition".into(),
                )));
            }
        }
        Actor::AssignedTutor => {
            if !es_tutor_asignado(&proyecto, &user) {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only the assigned tutor may perform this transition".into(),
                )));
            }
        }
    }

    // Guard contract: reject before any mutation when the observation rule
    // is not satisfied.
    let texto = lifecycle::check_observation(&plan, input.observacion.as_deref())?;
    let observacion = texto.map(|texto| NuevaObservacion {
        usuario_id: user.usuario_id,
        texto,
    });

    let outcome = ProyectoRepo::apply_transition(&state.pool, id, &plan, observacion).await?;
    let actualizado = match outcome {
        TransitionOutcome::Applied(p) => p,
        TransitionOutcome::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Proyecto",
                id,
            }))
        }
        TransitionOutcome::StateChanged(actual) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "The project moved to '{actual}' before this transition could be applied"
            ))))
        }
    };

    if let Some(event_type) = evento_para(&plan) {
        state.event_bus.publish(
            DomainEvent::new(event_type)
                .with_proyecto(id)
                .with_actor(user.usuario_id),
        );
    }

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "proyecto.estado",
        "proyecto",
        Some(id),
        Some(serde_json::json!({ "de": plan.from, "a": plan.to })),
    )
    .await;

    Ok(Json(Envelope::with_message(
        actualizado,
        format!("Project state is now '{}'", plan.to),
    )))
}

/// PATCH /api/v1/proyectos/{id}/asignar-tutor
///
/// Administrators assign or clear the project's tutor. The tutor must be
/// an active account with the `tutor` role.
pub async fn asignar_tutor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AsignarTutorRequest>,
) -> AppResult<Json<Envelope<Proyecto>>> {
    if let Some(tutor_id) = input.tutor_id {
        let tutor = UsuarioRepo::find_by_id(&state.pool, tutor_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Usuario",
                id: tutor_id,
            }))?;
        if tutor.rol != ROL_TUTOR || !tutor.activo {
            return Err(AppError::Core(CoreError::Validation(
                "tutor_id must reference an active tutor account".into(),
            )));
        }
    }

    let proyecto = ProyectoRepo::assign_tutor(&state.pool, id, input.tutor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id,
        }))?;

    if input.tutor_id.is_some() {
        state.event_bus.publish(
            DomainEvent::new(EVENTO_TUTOR_ASIGNADO)
                .with_proyecto(id)
                .with_actor(admin.usuario_id),
        );
    }

    registrar_auditoria(
        &state,
        Some(admin.usuario_id),
        "proyecto.asignar_tutor",
        "proyecto",
        Some(id),
        Some(serde_json::json!({ "tutor_id": input.tutor_id })),
    )
    .await;

    Ok(Json(Envelope::data(proyecto)))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// GET /api/v1/proyectos/estadisticas
pub async fn estadisticas(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Envelope<Estadisticas>>> {
    let (estudiante_id, tutor_id) = list_scope(&user);
    let por_estado = ProyectoRepo::counts_by_estado(&state.pool, estudiante_id, tutor_id).await?;
    let total = por_estado.iter().map(|c| c.cantidad).sum();
    Ok(Json(Envelope::data(Estadisticas { total, por_estado })))
}

/// GET /api/v1/proyectos/grafico
pub async fn grafico(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Envelope<Vec<PuntoMensual>>>> {
    let (estudiante_id, tutor_id) = list_scope(&user);
    let serie = ProyectoRepo::monthly_series(&state.pool, estudiante_id, tutor_id).await?;
    Ok(Json(Envelope::data(serie)))
}
