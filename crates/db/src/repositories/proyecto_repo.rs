//! Repository for the `proyectos` table.
//!
//! Lifecycle transitions are applied here inside a transaction that takes a
//! row lock, so concurrent writers serialize and the loser sees the state
//! that beat it.

use sqlx::PgPool;
use thesia_core::lifecycle::{Stamp, TransitionPlan};
use thesia_core::types::DbId;

use crate::models::observacion::NuevaObservacion;
use crate::models::proyecto::{
    CreateProyecto, EstadoCount, Proyecto, PuntoMensual, TransitionOutcome, UpdateProyecto,
};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, estudiante_id, tutor_id, titulo, descripcion, planteamiento, \
                        solucion_problema, objetivo_general, objetivos_especificos, metodologia, \
                        estado, version, fecha_creacion, fecha_envio, fecha_revision, \
                        fecha_aprobacion, updated_at";

/// Map a set-once stamp to its column name.
fn stamp_column(stamp: Stamp) -> &'static str {
    match stamp {
        Stamp::FechaEnvio => "fecha_envio",
        Stamp::FechaRevision => "fecha_revision",
        Stamp::FechaAprobacion => "fecha_aprobacion",
    }
}

/// Provides CRUD and lifecycle operations for projects.
pub struct ProyectoRepo;

impl ProyectoRepo {
    /// Insert a new draft project owned by `estudiante_id`.
    pub async fn create(
        pool: &PgPool,
        estudiante_id: DbId,
        input: &CreateProyecto,
    ) -> Result<Proyecto, sqlx::Error> {
        let query = format!(
            "INSERT INTO proyectos (estudiante_id, titulo, descripcion, planteamiento,
                                    solucion_problema, objetivo_general, objetivos_especificos,
                                    metodologia)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proyecto>(&query)
            .bind(estudiante_id)
            .bind(&input.titulo)
            .bind(&input.descripcion)
            .bind(&input.planteamiento)
            .bind(&input.solucion_problema)
            .bind(&input.objetivo_general)
            .bind(&input.objetivos_especificos)
            .bind(&input.metodologia)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proyecto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proyectos WHERE id = $1");
        sqlx::query_as::<_, Proyecto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, newest first, optionally scoped to an owning student
    /// and/or an assigned tutor.
    ///
    /// With both scopes `None` this lists everything (administrator view).
    pub async fn list(
        pool: &PgPool,
        estudiante_id: Option<DbId>,
        tutor_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Proyecto>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proyectos
             WHERE ($1::bigint IS NULL OR estudiante_id = $1)
               AND ($2::bigint IS NULL OR tutor_id = $2)
             ORDER BY fecha_creacion DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Proyecto>(&query)
            .bind(estudiante_id)
            .bind(tutor_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update project content. Only non-`None` fields are applied; every
    /// applied update bumps `version`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProyecto,
    ) -> Result<Option<Proyecto>, sqlx::Error> {
        let query = format!(
            "UPDATE proyectos SET
                titulo = COALESCE($2, titulo),
                descripcion = COALESCE($3, descripcion),
                planteamiento = COALESCE($4, planteamiento),
                solucion_problema = COALESCE($5, solucion_problema),
                objetivo_general = COALESCE($6, objetivo_general),
                objetivos_especificos = COALESCE($7, objetivos_especificos),
                metodologia = COALESCE($8, metodologia),
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proyecto>(&query)
            .bind(id)
            .bind(&input.titulo)
            .bind(&input.descripcion)
            .bind(&input.planteamiento)
            .bind(&input.solucion_problema)
            .bind(&input.objetivo_general)
            .bind(&input.objetivos_especificos)
            .bind(&input.metodologia)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a project. Observations and file metadata cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM proyectos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign (or clear, with `None`) the project's tutor.
    ///
    /// Returns `None` if no row with the given `id` exists. Referential
    /// validity of the tutor id is the caller's concern.
    pub async fn assign_tutor(
        pool: &PgPool,
        id: DbId,
        tutor_id: Option<DbId>,
    ) -> Result<Option<Proyecto>, sqlx::Error> {
        let query = format!(
            "UPDATE proyectos SET tutor_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proyecto>(&query)
            .bind(id)
            .bind(tutor_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a planned lifecycle transition atomically.
    ///
    /// Re-reads the row under `FOR UPDATE`; if its state no longer matches
    /// the plan's `from`, nothing is written and the observed state is
    /// returned. The state write, set-once timestamp, and observation
    /// insert commit together or not at all.
    pub async fn apply_transition(
        pool: &PgPool,
        id: DbId,
        plan: &TransitionPlan,
        observacion: Option<NuevaObservacion<'_>>,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT estado FROM proyectos WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((estado,)) = current else {
            return Ok(TransitionOutcome::NotFound);
        };
        if estado != plan.from {
            // Dropping the transaction rolls back the lock.
            return Ok(TransitionOutcome::StateChanged(estado));
        }

        let stamp_clause = match plan.stamp {
            Some(stamp) => {
                let col = stamp_column(stamp);
                format!(", {col} = COALESCE({col}, NOW())")
            }
            None => String::new(),
        };
        let query = format!(
            "UPDATE proyectos SET estado = $2, updated_at = NOW(){stamp_clause}
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let proyecto = sqlx::query_as::<_, Proyecto>(&query)
            .bind(id)
            .bind(plan.to)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(obs) = observacion {
            sqlx::query(
                "INSERT INTO observaciones (proyecto_id, usuario_id, observacion, estado_proyecto)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(obs.usuario_id)
            .bind(obs.texto)
            .bind(plan.to)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(proyecto))
    }

    /// Per-state project counts, optionally scoped like [`Self::list`].
    pub async fn counts_by_estado(
        pool: &PgPool,
        estudiante_id: Option<DbId>,
        tutor_id: Option<DbId>,
    ) -> Result<Vec<EstadoCount>, sqlx::Error> {
        sqlx::query_as::<_, EstadoCount>(
            "SELECT estado, COUNT(*) AS cantidad FROM proyectos
             WHERE ($1::bigint IS NULL OR estudiante_id = $1)
               AND ($2::bigint IS NULL OR tutor_id = $2)
             GROUP BY estado
             ORDER BY estado",
        )
        .bind(estudiante_id)
        .bind(tutor_id)
        .fetch_all(pool)
        .await
    }

    /// Monthly created/approved series for the statistics chart, optionally
    /// scoped like [`Self::list`]. Months with no activity are absent.
    pub async fn monthly_series(
        pool: &PgPool,
        estudiante_id: Option<DbId>,
        tutor_id: Option<DbId>,
    ) -> Result<Vec<PuntoMensual>, sqlx::Error> {
        sqlx::query_as::<_, PuntoMensual>(
            "WITH creados AS (
                SELECT to_char(date_trunc('month', fecha_creacion), 'YYYY-MM') AS mes,
                       COUNT(*) AS n
                FROM proyectos
                WHERE ($1::bigint IS NULL OR estudiante_id = $1)
                  AND ($2::bigint IS NULL OR tutor_id = $2)
                GROUP BY 1
            ), aprobados AS (
                SELECT to_char(date_trunc('month', fecha_aprobacion), 'YYYY-MM') AS mes,
                       COUNT(*) AS n
                FROM proyectos
                WHERE fecha_aprobacion IS NOT NULL
                  AND ($1::bigint IS NULL OR estudiante_id = $1)
                  AND ($2::bigint IS NULL OR tutor_id = $2)
                GROUP BY 1
            )
            SELECT COALESCE(c.mes, a.mes) AS mes,
                   COALESCE(c.n, 0) AS creados,
                   COALESCE(a.n, 0) AS aprobados
            FROM creados c
            FULL OUTER JOIN aprobados a ON c.mes = a.mes
            ORDER BY mes",
        )
        .bind(estudiante_id)
        .bind(tutor_id)
        .fetch_all(pool)
        .await
    }
}
