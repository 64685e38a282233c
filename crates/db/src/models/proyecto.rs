//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// A project row from the `proyectos` table.
///
/// `estado` holds one of the lifecycle states defined in
/// `thesia_core::lifecycle`; the `fecha_*` columns are set at most once,
/// when the corresponding transition first occurs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proyecto {
    pub id: DbId,
    pub estudiante_id: DbId,
    pub tutor_id: Option<DbId>,
    pub titulo: String,
    pub descripcion: String,
    pub planteamiento: Option<String>,
    pub solucion_problema: Option<String>,
    pub objetivo_general: Option<String>,
    pub objetivos_especificos: Option<String>,
    pub metodologia: Option<String>,
    pub estado: String,
    pub version: i32,
    pub fecha_creacion: Timestamp,
    pub fecha_envio: Option<Timestamp>,
    pub fecha_revision: Option<Timestamp>,
    pub fecha_aprobacion: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. The owner comes from the session, the
/// state is always `borrador`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProyecto {
    pub titulo: String,
    pub descripcion: String,
    pub planteamiento: Option<String>,
    pub solucion_problema: Option<String>,
    pub objetivo_general: Option<String>,
    pub objetivos_especificos: Option<String>,
    pub metodologia: Option<String>,
}

/// DTO for updating project content. Only non-`None` fields are applied;
/// every applied update bumps `version`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProyecto {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub planteamiento: Option<String>,
    pub solucion_problema: Option<String>,
    pub objetivo_general: Option<String>,
    pub objetivos_especificos: Option<String>,
    pub metodologia: Option<String>,
}

/// Per-state project count (aggregate query result).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EstadoCount {
    pub estado: String,
    pub cantidad: i64,
}

/// One month of created/approved counts for the statistics chart.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PuntoMensual {
    /// Month in `YYYY-MM` format.
    pub mes: String,
    pub creados: i64,
    pub aprobados: i64,
}

/// Outcome of attempting a lifecycle transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// The transition was applied; the updated row is returned.
    Applied(Proyecto),
    /// No project with the given id exists.
    NotFound,
    /// Another writer moved the project out of the expected state first.
    /// Carries the state observed under lock.
    StateChanged(String),
}
