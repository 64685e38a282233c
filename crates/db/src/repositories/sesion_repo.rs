//! Repository for the `sesiones` table (refresh-token sessions).

use sqlx::PgPool;
use thesia_core::types::DbId;

use crate::models::sesion::{CreateSesion, Sesion};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, usuario_id, refresh_token_hash, expires_at, revoked, fecha_creacion";

/// Provides operations for refresh-token sessions.
pub struct SesionRepo;

impl SesionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSesion) -> Result<Sesion, sqlx::Error> {
        let query = format!(
            "INSERT INTO sesiones (usuario_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sesion>(&query)
            .bind(input.usuario_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the live session matching a refresh-token hash, if any.
    /// Revoked and expired sessions never match.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<Sesion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sesiones
             WHERE refresh_token_hash = $1 AND revoked = false AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Sesion>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session (refresh-token rotation).
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sesiones SET revoked = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Revoke every session belonging to a user (logout everywhere).
    pub async fn revoke_all_for_usuario(pool: &PgPool, usuario_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sesiones SET revoked = true WHERE usuario_id = $1 AND revoked = false")
            .bind(usuario_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
