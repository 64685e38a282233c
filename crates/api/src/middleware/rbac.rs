//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the requirement. Use these in route handlers to enforce
//! authorization at the type level. Ownership checks (owning student,
//! assigned tutor) still happen in the handlers -- a role alone never
//! grants access to someone else's project.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use thesia_core::error::CoreError;
use thesia_core::roles::{ROL_ADMINISTRADOR, ROL_ESTUDIANTE, ROL_TUTOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `administrador` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an administrator here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.rol != ROL_ADMINISTRADOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Administrator role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `tutor` role. Rejects with 403 Forbidden otherwise.
pub struct RequireTutor(pub AuthUser);

impl FromRequestParts<AppState> for RequireTutor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.rol != ROL_TUTOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Tutor role required".into(),
            )));
        }
        Ok(RequireTutor(user))
    }
}

/// Requires the `estudiante` role. Rejects with 403 Forbidden otherwise.
pub struct RequireEstudiante(pub AuthUser);

impl FromRequestParts<AppState> for RequireEstudiante {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.rol != ROL_ESTUDIANTE {
            return Err(AppError::Core(CoreError::Forbidden(
                "Student role required".into(),
            )));
        }
        Ok(RequireEstudiante(user))
    }
}
