//! Audit log entity models and DTOs.
//!
//! The audit trail is append-only; rows are immutable once created and have
//! no `updated_at` column.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegistroAuditoria {
    pub id: DbId,
    /// Acting user; `None` for anonymous actions (failed logins).
    pub usuario_id: Option<DbId>,
    /// Dot-separated action name, e.g. `"proyecto.estado"`.
    pub accion: String,
    pub entidad: Option<String>,
    pub entidad_id: Option<DbId>,
    /// Free-form JSON with action-specific detail.
    pub detalle: Option<serde_json::Value>,
    pub fecha_creacion: Timestamp,
}

/// DTO for inserting a new audit entry.
#[derive(Debug, Clone)]
pub struct CreateRegistro {
    pub usuario_id: Option<DbId>,
    pub accion: String,
    pub entidad: Option<String>,
    pub entidad_id: Option<DbId>,
    pub detalle: Option<serde_json::Value>,
}

/// Filter parameters for querying the audit log.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub usuario_id: Option<DbId>,
    pub accion: Option<String>,
    pub entidad: Option<String>,
    pub entidad_id: Option<DbId>,
    pub desde: Option<Timestamp>,
    pub hasta: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated response for audit queries.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub items: Vec<RegistroAuditoria>,
    pub total: i64,
}
