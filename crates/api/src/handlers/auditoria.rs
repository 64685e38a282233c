//! Handler for querying the audit trail (administrators only).

use axum::extract::{Query, State};
use axum::Json;
use thesia_db::models::audit::{AuditPage, AuditQuery};
use thesia_db::repositories::AuditRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::Envelope;
use crate::state::AppState;

/// GET /api/v1/auditoria
pub async fn query(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<Envelope<AuditPage>>> {
    let page = AuditRepo::query(&state.pool, &params).await?;
    Ok(Json(Envelope::data(page)))
}
