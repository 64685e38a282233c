//! Refresh-token session model.

use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// A row from the `sesiones` table.
///
/// Stores only the SHA-256 hash of the refresh token, never the plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct Sesion {
    pub id: DbId,
    pub usuario_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked: bool,
    pub fecha_creacion: Timestamp,
}

/// DTO for creating a session.
#[derive(Debug, Clone)]
pub struct CreateSesion {
    pub usuario_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
