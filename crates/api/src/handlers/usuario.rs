//! Handlers for the `/usuarios` resource: account administration, the
//! tutor directory, and the public email-existence check.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use thesia_core::error::CoreError;
use thesia_core::roles::{validate_rol, ROL_ESTUDIANTE};
use thesia_core::types::DbId;
use thesia_db::models::usuario::{CreateUsuario, UpdateUsuario, UsuarioResponse};
use thesia_db::repositories::UsuarioRepo;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::registrar_auditoria;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::Envelope;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /usuarios`.
#[derive(Debug, Deserialize)]
pub struct ListUsuariosParams {
    pub rol: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /usuarios` (admin-created staff accounts).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUsuarioRequest {
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub apellido: String,
    /// `tutor` or `administrador`; students register themselves.
    pub rol: String,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
}

/// Query parameters for `GET /usuarios/existe-email`.
#[derive(Debug, Deserialize)]
pub struct ExisteEmailParams {
    pub email: String,
}

/// Payload for the email-existence check.
#[derive(Debug, Serialize)]
pub struct ExisteEmailData {
    pub existe: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/usuarios/tutores
///
/// Active tutor directory; any authenticated user may read it (students
/// see who could supervise them).
pub async fn list_tutores(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Envelope<Vec<UsuarioResponse>>>> {
    let tutores = UsuarioRepo::list_tutores_activos(&state.pool).await?;
    let data = tutores.into_iter().map(UsuarioResponse::from).collect();
    Ok(Json(Envelope::data(data)))
}

/// GET /api/v1/usuarios
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListUsuariosParams>,
) -> AppResult<Json<Envelope<Vec<UsuarioResponse>>>> {
    if let Some(rol) = &params.rol {
        validate_rol(rol)?;
    }
    let usuarios = UsuarioRepo::list(
        &state.pool,
        params.rol.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;
    let data = usuarios.into_iter().map(UsuarioResponse::from).collect();
    Ok(Json(Envelope::data(data)))
}

/// POST /api/v1/usuarios
///
/// Administrators create tutor and administrator accounts. Student
/// accounts come only through self-registration.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUsuarioRequest>,
) -> AppResult<(StatusCode, Json<Envelope<UsuarioResponse>>)> {
    input.validate().map_err(AppError::from_validator)?;
    validate_rol(&input.rol)?;
    if input.rol == ROL_ESTUDIANTE {
        return Err(AppError::Core(CoreError::Validation(
            "Student accounts are created through registration, not by administrators".into(),
        )));
    }

    if UsuarioRepo::email_exists(&state.pool, &input.email).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let usuario = UsuarioRepo::create(
        &state.pool,
        &CreateUsuario {
            email: input.email,
            password_hash,
            nombre: input.nombre,
            apellido: input.apellido,
            rol: input.rol,
            cedula: input.cedula,
            telefono: input.telefono,
        },
    )
    .await?;

    registrar_auditoria(
        &state,
        Some(admin.usuario_id),
        "usuario.crear",
        "usuario",
        Some(usuario.id),
        Some(serde_json::json!({ "rol": usuario.rol })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(Envelope::data(usuario.into()))))
}

/// PUT /api/v1/usuarios/{id}
///
/// Updates profile fields and the `activo` flag. Roles are never changed
/// after creation.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUsuario>,
) -> AppResult<Json<Envelope<UsuarioResponse>>> {
    let usuario = UsuarioRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Usuario",
            id,
        }))?;

    registrar_auditoria(
        &state,
        Some(admin.usuario_id),
        "usuario.actualizar",
        "usuario",
        Some(id),
        None,
    )
    .await;

    Ok(Json(Envelope::data(usuario.into())))
}

/// DELETE /api/v1/usuarios/{id}
///
/// Soft-deactivation: the account stops authenticating but its history
/// (projects, observations, audit rows) stays intact.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.usuario_id == id {
        return Err(AppError::Core(CoreError::Conflict(
            "Administrators cannot deactivate their own account".into(),
        )));
    }

    UsuarioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Usuario",
            id,
        }))?;

    UsuarioRepo::deactivate(&state.pool, id).await?;

    registrar_auditoria(
        &state,
        Some(admin.usuario_id),
        "usuario.desactivar",
        "usuario",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/usuarios/existe-email
///
/// Public endpoint used by registration forms to pre-check availability.
pub async fn existe_email(
    State(state): State<AppState>,
    Query(params): Query<ExisteEmailParams>,
) -> AppResult<Json<Envelope<ExisteEmailData>>> {
    let existe = UsuarioRepo::email_exists(&state.pool, &params.email).await?;
    Ok(Json(Envelope::data(ExisteEmailData { existe })))
}
