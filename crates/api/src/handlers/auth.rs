//! Handlers for the `/auth` resource (login, registration, profile,
//! refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thesia_core::error::CoreError;
use thesia_core::roles::{dashboard_route, ROL_ESTUDIANTE};
use thesia_db::models::sesion::CreateSesion;
use thesia_db::models::usuario::{CreateUsuario, UsuarioResponse};
use thesia_db::repositories::{SesionRepo, UsuarioRepo};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::registrar_auditoria;
use crate::middleware::auth::AuthUser;
use crate::response::Envelope;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/registro` (student self-registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegistroRequest {
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub apellido: String,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication payload returned by login, registration, and
/// refresh.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub usuario: UsuarioResponse,
    /// Dashboard route for the user's role (client lands here after login).
    pub dashboard: &'static str,
}

/// Profile payload returned by `GET /auth/perfil`.
#[derive(Debug, Serialize)]
pub struct PerfilData {
    pub usuario: UsuarioResponse,
    pub dashboard: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<Envelope<AuthData>>> {
    // 1. Find user by email.
    let usuario = UsuarioRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    // 2. Check if the account is active.
    if !usuario.activo {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 3. Check if the account is temporarily locked.
    if let Some(locked_until) = usuario.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 4. Verify password.
    let password_valid = verify_password(&input.password, &usuario.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock if threshold exceeded.
        UsuarioRepo::increment_failed_login(&state.pool, usuario.id).await?;

        let new_count = usuario.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UsuarioRepo::lock_account(&state.pool, usuario.id, lock_until).await?;
        }

        registrar_auditoria(
            &state,
            None,
            "auth.login_fallido",
            "usuario",
            Some(usuario.id),
            None,
        )
        .await;

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // 6. On success: reset failed count, set last_login_at.
    UsuarioRepo::record_successful_login(&state.pool, usuario.id).await?;

    registrar_auditoria(
        &state,
        Some(usuario.id),
        "auth.login",
        "usuario",
        Some(usuario.id),
        None,
    )
    .await;

    // 7. Generate tokens and create session.
    let data = create_auth_data(&state, usuario.into()).await?;
    Ok(Json(Envelope::data(data)))
}

/// POST /api/v1/auth/registro
///
/// Self-service registration; every account created here is a student.
/// Returns tokens so the client is logged in immediately.
pub async fn registro(
    State(state): State<AppState>,
    Json(input): Json<RegistroRequest>,
) -> AppResult<(StatusCode, Json<Envelope<AuthData>>)> {
    input.validate().map_err(AppError::from_validator)?;

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
            rol: ROL_ESTUDIANTE.to_string(),
            cedula: input.cedula,
            telefono: input.telefono,
        },
    )
    .await?;

    registrar_auditoria(
        &state,
        Some(usuario.id),
        "auth.registro",
        "usuario",
        Some(usuario.id),
        None,
    )
    .await;

    let data = create_auth_data(&state, usuario.into()).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(data))))
}

/// GET /api/v1/auth/perfil
///
/// Re-validate the bearer token and return the current user. This is the
/// endpoint session bootstrap calls to verify a cached session; a 401 here
/// tells the client to discard it.
pub async fn perfil(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Envelope<PerfilData>>> {
    let usuario = UsuarioRepo::find_by_id(&state.pool, auth_user.usuario_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;

    if !usuario.activo {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is deactivated".into(),
        )));
    }

    let dashboard = dashboard_route(&usuario.rol)
        .map_err(|_| AppError::InternalError(format!("User {} has unknown role", usuario.id)))?;

    Ok(Json(Envelope::data(PerfilData {
        usuario: usuario.into(),
        dashboard,
    })))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<Envelope<AuthData>>> {
    // 1. Hash the provided refresh token.
    let token_hash = hash_refresh_token(&input.refresh_token);

    // 2. Find matching active session.
    let sesion = SesionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // 3. Revoke old session (token rotation).
    SesionRepo::revoke(&state.pool, sesion.id).await?;

    // 4. Find user.
    let usuario = UsuarioRepo::find_by_id(&state.pool, sesion.usuario_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;

    if !usuario.activo {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 5. Generate new tokens and create a new session.
    let data = create_auth_data(&state, usuario.into()).await?;
    Ok(Json(Envelope::data(data)))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SesionRepo::revoke_all_for_usuario(&state.pool, auth_user.usuario_id).await?;
    registrar_auditoria(
        &state,
        Some(auth_user.usuario_id),
        "auth.logout",
        "usuario",
        Some(auth_user.usuario_id),
        None,
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the
/// response payload.
async fn create_auth_data(state: &AppState, usuario: UsuarioResponse) -> AppResult<AuthData> {
    let token = generate_access_token(usuario.id, &usuario.rol, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let sesion_input = CreateSesion {
        usuario_id: usuario.id,
        refresh_token_hash: refresh_hash,
        expires_at,
    };
    SesionRepo::create(&state.pool, &sesion_input).await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    let dashboard = dashboard_route(&usuario.rol)
        .map_err(|_| AppError::InternalError(format!("User {} has unknown role", usuario.id)))?;

    Ok(AuthData {
        token,
        refresh_token: refresh_plaintext,
        expires_in,
        usuario,
        dashboard,
    })
}