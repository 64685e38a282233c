//! Assistant conversation and message models.

use serde::Serialize;
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// Message authored by the human user.
pub const MENSAJE_ROL_USER: &str = "user";

/// Message authored by the assistant provider.
pub const MENSAJE_ROL_ASSISTANT: &str = "assistant";

/// A row from the `conversaciones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversacion {
    pub id: DbId,
    pub usuario_id: DbId,
    pub titulo: String,
    pub fecha_creacion: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `mensajes` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mensaje {
    pub id: DbId,
    pub conversacion_id: DbId,
    /// `user` or `assistant`.
    pub rol: String,
    pub contenido: String,
    pub fecha_creacion: Timestamp,
}
