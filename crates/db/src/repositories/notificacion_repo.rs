//! Repository for the `notificaciones` table.

use sqlx::PgPool;
use thesia_core::types::DbId;

use crate::models::notificacion::{CreateNotificacion, Notificacion};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, usuario_id, titulo, mensaje, proyecto_id, leida, fecha_creacion";

/// Provides operations for user notifications.
pub struct NotificacionRepo;

impl NotificacionRepo {
    /// Insert a notification, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotificacion,
    ) -> Result<Notificacion, sqlx::Error> {
        let query = format!(
            "INSERT INTO notificaciones (usuario_id, titulo, mensaje, proyecto_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notificacion>(&query)
            .bind(input.usuario_id)
            .bind(&input.titulo)
            .bind(&input.mensaje)
            .bind(input.proyecto_id)
            .fetch_one(pool)
            .await
    }

    /// List a user's notifications, newest first, optionally unread only.
    pub async fn list_for_usuario(
        pool: &PgPool,
        usuario_id: DbId,
        solo_no_leidas: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Notificacion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notificaciones
             WHERE usuario_id = $1 AND (NOT $2 OR leida = false)
             ORDER BY fecha_creacion DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notificacion>(&query)
            .bind(usuario_id)
            .bind(solo_no_leidas)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Mark one of the user's notifications as read. Returns `true` if a
    /// row was updated.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        usuario_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notificaciones SET leida = true
             WHERE id = $1 AND usuario_id = $2 AND leida = false",
        )
        .bind(id)
        .bind(usuario_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's notifications as read. Returns how many changed.
    pub async fn mark_all_read(pool: &PgPool, usuario_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notificaciones SET leida = true
             WHERE usuario_id = $1 AND leida = false",
        )
        .bind(usuario_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, usuario_id: DbId) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notificaciones WHERE usuario_id = $1 AND leida = false",
        )
        .bind(usuario_id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }
}
