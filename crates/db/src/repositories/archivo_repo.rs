//! Repository for the `archivos` table (file metadata).

use sqlx::PgPool;
use thesia_core::types::DbId;

use crate::models::archivo::{Archivo, CreateArchivo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, proyecto_id, nombre_original, nombre_almacenado, tipo_mime, \
                        tamano, subido_por, fecha_creacion";

/// Provides CRUD operations for project file metadata.
pub struct ArchivoRepo;

impl ArchivoRepo {
    /// Record an uploaded file, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateArchivo) -> Result<Archivo, sqlx::Error> {
        let query = format!(
            "INSERT INTO archivos (proyecto_id, nombre_original, nombre_almacenado,
                                   tipo_mime, tamano, subido_por)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Archivo>(&query)
            .bind(input.proyecto_id)
            .bind(&input.nombre_original)
            .bind(&input.nombre_almacenado)
            .bind(&input.tipo_mime)
            .bind(input.tamano)
            .bind(input.subido_por)
            .fetch_one(pool)
            .await
    }

    /// Find a file by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Archivo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM archivos WHERE id = $1");
        sqlx::query_as::<_, Archivo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's files, newest first.
    pub async fn list_by_proyecto(
        pool: &PgPool,
        proyecto_id: DbId,
    ) -> Result<Vec<Archivo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM archivos
             WHERE proyecto_id = $1
             ORDER BY fecha_creacion DESC"
        );
        sqlx::query_as::<_, Archivo>(&query)
            .bind(proyecto_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a file's metadata row. Returns `true` if a row was removed.
    /// Removing the bytes on disk is the caller's responsibility.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM archivos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
