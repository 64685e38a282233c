//! HTTP handlers, one module per resource.

pub mod archivo;
pub mod auditoria;
pub mod auth;
pub mod canvas;
pub mod chat;
pub mod notificacion;
pub mod observacion;
pub mod proyecto;
pub mod usuario;

use thesia_core::types::DbId;
use thesia_db::models::audit::CreateRegistro;
use thesia_db::repositories::AuditRepo;

use crate::state::AppState;

/// Write an audit entry for a completed action.
///
/// Audit failures are logged but never fail the request that triggered
/// them.
pub(crate) async fn registrar_auditoria(
    state: &AppState,
    usuario_id: Option<DbId>,
    accion: &str,
    entidad: &str,
    entidad_id: Option<DbId>,
    detalle: Option<serde_json::Value>,
) {
    let input = CreateRegistro {
        usuario_id,
        accion: accion.to_string(),
        entidad: Some(entidad.to_string()),
        entidad_id,
        detalle,
    };
    if let Err(e) = AuditRepo::insert(&state.pool, &input).await {
        tracing::warn!(error = %e, accion, "Failed to write audit entry");
    }
}
