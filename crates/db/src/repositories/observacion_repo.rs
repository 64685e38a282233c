//! Repository for the `observaciones` table. Append-only.

use sqlx::PgPool;
use thesia_core::types::DbId;

use crate::models::observacion::Observacion;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, proyecto_id, usuario_id, observacion, estado_proyecto, fecha_creacion";

/// Provides append and list operations for observations. There are no
/// update or delete methods on purpose.
pub struct ObservacionRepo;

impl ObservacionRepo {
    /// Append an observation outside of a lifecycle transition (follow-up
    /// notes on a project already in review).
    pub async fn create(
        pool: &PgPool,
        proyecto_id: DbId,
        usuario_id: DbId,
        texto: &str,
        estado_proyecto: &str,
    ) -> Result<Observacion, sqlx::Error> {
        let query = format!(
            "INSERT INTO observaciones (proyecto_id, usuario_id, observacion, estado_proyecto)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Observacion>(&query)
            .bind(proyecto_id)
            .bind(usuario_id)
            .bind(texto)
            .bind(estado_proyecto)
            .fetch_one(pool)
            .await
    }

    /// List a project's observations, oldest first (display order).
    pub async fn list_by_proyecto(
        pool: &PgPool,
        proyecto_id: DbId,
    ) -> Result<Vec<Observacion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM observaciones
             WHERE proyecto_id = $1
             ORDER BY fecha_creacion ASC, id ASC"
        );
        sqlx::query_as::<_, Observacion>(&query)
            .bind(proyecto_id)
            .fetch_all(pool)
            .await
    }

    /// Number of observations attached to a project.
    pub async fn count_by_proyecto(pool: &PgPool, proyecto_id: DbId) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM observaciones WHERE proyecto_id = $1")
                .bind(proyecto_id)
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }
}
