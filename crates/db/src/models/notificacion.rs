//! Notification entity model.

use serde::Serialize;
use sqlx::FromRow;
use thesia_core::types::{DbId, Timestamp};

/// A row from the `notificaciones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notificacion {
    pub id: DbId,
    pub usuario_id: DbId,
    pub titulo: String,
    pub mensaje: String,
    /// Project the notification refers to, when applicable.
    pub proyecto_id: Option<DbId>,
    pub leida: bool,
    pub fecha_creacion: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct CreateNotificacion {
    pub usuario_id: DbId,
    pub titulo: String,
    pub mensaje: String,
    pub proyecto_id: Option<DbId>,
}
