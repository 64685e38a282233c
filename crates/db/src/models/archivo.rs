//! Project file metadata model.
//!
//! Only metadata lives in the database; bytes are stored on disk under the
//! server's configured storage directory.

use serde::Serialize;
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// A row from the `archivos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Archivo {
    pub id: DbId,
    pub proyecto_id: DbId,
    /// Name the client uploaded the file under.
    pub nombre_original: String,
    /// Server-generated unique name on disk. Never exposed as a path.
    pub nombre_almacenado: String,
    pub tipo_mime: String,
    pub tamano: i64,
    pub subido_por: DbId,
    pub fecha_creacion: Timestamp,
}

/// DTO for recording an uploaded file.
#[derive(Debug, Clone)]
pub struct CreateArchivo {
    pub proyecto_id: DbId,
    pub nombre_original: String,
    pub nombre_almacenado: String,
    pub tipo_mime: String,
    pub tamano: i64,
    pub subido_por: DbId,
}
