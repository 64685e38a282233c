//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// Full user row from the `usuarios` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UsuarioResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: String,
    pub activo: bool,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub fecha_creacion: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UsuarioResponse {
    pub id: DbId,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: String,
    pub activo: bool,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
    pub fecha_creacion: Timestamp,
}

impl From<Usuario> for UsuarioResponse {
    fn from(u: Usuario) -> Self {
        Self {
            id: u.id,
            email: u.email,
            nombre: u.nombre,
            apellido: u.apellido,
            rol: u.rol,
            activo: u.activo,
            cedula: u.cedula,
            telefono: u.telefono,
            fecha_creacion: u.fecha_creacion,
        }
    }
}

/// DTO for creating a new user. The password arrives here already hashed.
#[derive(Debug, Clone)]
pub struct CreateUsuario {
    pub email: String,
    pub password_hash: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: String,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
///
/// `rol` is deliberately absent: roles are assigned at creation and never
/// changed afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUsuario {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
    pub activo: Option<bool>,
}
