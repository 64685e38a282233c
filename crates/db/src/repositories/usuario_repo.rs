//! Repository for the `usuarios` table.

use sqlx::PgPool;
use thesia_core::types::{DbId, Timestamp};

use crate::models::usuario::{CreateUsuario, UpdateUsuario, Usuario};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, nombre, apellido, rol, activo, \
                        cedula, telefono, last_login_at, failed_login_count, locked_until, \
                        fecha_creacion, updated_at";

/// Provides CRUD operations for users.
pub struct UsuarioRepo;

impl UsuarioRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUsuario) -> Result<Usuario, sqlx::Error> {
        let query = format!(
            "INSERT INTO usuarios (email, password_hash, nombre, apellido, rol, cedula, telefono)
             VALUES (LOWER($1), $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Usuario>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.nombre)
            .bind(&input.apellido)
            .bind(&input.rol)
            .bind(&input.cedula)
            .bind(&input.telefono)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Usuario>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM usuarios WHERE id = $1");
        sqlx::query_as::<_, Usuario>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (stored lowercase; compared case-insensitively).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Usuario>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM usuarios WHERE email = LOWER($1)");
        sqlx::query_as::<_, Usuario>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Whether any account exists with the given email.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM usuarios WHERE email = LOWER($1))")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(exists.0)
    }

    /// List users, optionally filtered by role, newest first.
    pub async fn list(
        pool: &PgPool,
        rol: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Usuario>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM usuarios
             WHERE ($1::text IS NULL OR rol = $1)
             ORDER BY fecha_creacion DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Usuario>(&query)
            .bind(rol)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// List active tutors ordered by last name. Used for the tutor directory
    /// and for validating tutor assignment.
    pub async fn list_tutores_activos(pool: &PgPool) -> Result<Vec<Usuario>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM usuarios
             WHERE rol = 'tutor' AND activo = true
             ORDER BY apellido, nombre"
        );
        sqlx::query_as::<_, Usuario>(&query).fetch_all(pool).await
    }

    /// Update a user's profile fields. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUsuario,
    ) -> Result<Option<Usuario>, sqlx::Error> {
        let query = format!(
            "UPDATE usuarios SET
                nombre = COALESCE($2, nombre),
                apellido = COALESCE($3, apellido),
                cedula = COALESCE($4, cedula),
                telefono = COALESCE($5, telefono),
                activo = COALESCE($6, activo),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Usuario>(&query)
            .bind(id)
            .bind(&input.nombre)
            .bind(&input.apellido)
            .bind(&input.cedula)
            .bind(&input.telefono)
            .bind(input.activo)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a user by setting `activo = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE usuarios SET activo = false, updated_at = NOW()
             WHERE id = $1 AND activo = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE usuarios SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(pool: &PgPool, id: DbId, until: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE usuarios SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset the failure counter, clear any lock,
    /// and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE usuarios SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
