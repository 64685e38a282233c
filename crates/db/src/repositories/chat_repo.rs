//! Repository for the `conversaciones` and `mensajes` tables.

use sqlx::PgPool;
use thesia_core::types::DbId;

use crate::models::chat::{Conversacion, Mensaje};

const CONV_COLUMNS: &str = "id, usuario_id, titulo, fecha_creacion, updated_at";
const MSG_COLUMNS: &str = "id, conversacion_id, rol, contenido, fecha_creacion";

/// Provides operations for assistant conversations and their messages.
pub struct ChatRepo;

impl ChatRepo {
    /// Create a conversation for a user.
    pub async fn create_conversacion(
        pool: &PgPool,
        usuario_id: DbId,
        titulo: &str,
    ) -> Result<Conversacion, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversaciones (usuario_id, titulo)
             VALUES ($1, $2)
             RETURNING {CONV_COLUMNS}"
        );
        sqlx::query_as::<_, Conversacion>(&query)
            .bind(usuario_id)
            .bind(titulo)
            .fetch_one(pool)
            .await
    }

    /// Find a conversation by ID.
    pub async fn find_conversacion(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Conversacion>, sqlx::Error> {
        let query = format!("SELECT {CONV_COLUMNS} FROM conversaciones WHERE id = $1");
        sqlx::query_as::<_, Conversacion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's conversations, most recently active first.
    pub async fn list_conversaciones(
        pool: &PgPool,
        usuario_id: DbId,
    ) -> Result<Vec<Conversacion>, sqlx::Error> {
        let query = format!(
            "SELECT {CONV_COLUMNS} FROM conversaciones
             WHERE usuario_id = $1
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, Conversacion>(&query)
            .bind(usuario_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a conversation; its messages cascade. Returns `true` if a
    /// row was removed.
    pub async fn delete_conversacion(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM conversaciones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a message and bump the conversation's `updated_at`.
    pub async fn add_mensaje(
        pool: &PgPool,
        conversacion_id: DbId,
        rol: &str,
        contenido: &str,
    ) -> Result<Mensaje, sqlx::Error> {
        let query = format!(
            "INSERT INTO mensajes (conversacion_id, rol, contenido)
             VALUES ($1, $2, $3)
             RETURNING {MSG_COLUMNS}"
        );
        let mensaje = sqlx::query_as::<_, Mensaje>(&query)
            .bind(conversacion_id)
            .bind(rol)
            .bind(contenido)
            .fetch_one(pool)
            .await?;

        sqlx::query("UPDATE conversaciones SET updated_at = NOW() WHERE id = $1")
            .bind(conversacion_id)
            .execute(pool)
            .await?;

        Ok(mensaje)
    }

    /// List a conversation's messages, oldest first.
    pub async fn list_mensajes(
        pool: &PgPool,
        conversacion_id: DbId,
    ) -> Result<Vec<Mensaje>, sqlx::Error> {
        let query = format!(
            "SELECT {MSG_COLUMNS} FROM mensajes
             WHERE conversacion_id = $1
             ORDER BY fecha_creacion ASC, id ASC"
        );
        sqlx::query_as::<_, Mensaje>(&query)
            .bind(conversacion_id)
            .fetch_all(pool)
            .await
    }
}
