//! Observation entity model.
//!
//! Observations are append-only: there are no update or delete DTOs.

use serde::Serialize;
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// Borrowed input for appending an observation inside a transition
/// transaction. The project state at time of writing is supplied by the
/// transition itself.
#[derive(Debug, Clone, Copy)]
pub struct NuevaObservacion<'a> {
    pub usuario_id: DbId,
    pub texto: &'a str,
}

/// A row from the `observaciones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Observacion {
    pub id: DbId,
    pub proyecto_id: DbId,
    /// Author of the note (tutor or administrator).
    pub usuario_id: DbId,
    pub observacion: String,
    /// Project state at the time the note was written.
    pub estado_proyecto: String,
    pub fecha_creacion: Timestamp,
}
