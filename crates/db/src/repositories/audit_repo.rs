//! Repository for the append-only `auditoria` table.

use sqlx::PgPool;

use crate::models::audit::{AuditPage, AuditQuery, CreateRegistro, RegistroAuditoria};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, usuario_id, accion, entidad, entidad_id, detalle, fecha_creacion";

/// Shared filter clause for [`AuditRepo::query`]; bind order matches the
/// fields of [`AuditQuery`].
const FILTER: &str = "($1::bigint IS NULL OR usuario_id = $1)
               AND ($2::text IS NULL OR accion = $2)
               AND ($3::text IS NULL OR entidad = $3)
               AND ($4::bigint IS NULL OR entidad_id = $4)
               AND ($5::timestamptz IS NULL OR fecha_creacion >= $5)
               AND ($6::timestamptz IS NULL OR fecha_creacion <= $6)";

/// Provides insert and query operations for the audit trail. There are no
/// update or delete methods: audit entries are immutable.
pub struct AuditRepo;

impl AuditRepo {
    /// Insert a new audit entry, returning the created row.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateRegistro,
    ) -> Result<RegistroAuditoria, sqlx::Error> {
        let query = format!(
            "INSERT INTO auditoria (usuario_id, accion, entidad, entidad_id, detalle)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RegistroAuditoria>(&query)
            .bind(input.usuario_id)
            .bind(&input.accion)
            .bind(&input.entidad)
            .bind(input.entidad_id)
            .bind(&input.detalle)
            .fetch_one(pool)
            .await
    }

    /// Query the audit log with optional filters, newest first, paginated.
    pub async fn query(pool: &PgPool, q: &AuditQuery) -> Result<AuditPage, sqlx::Error> {
        let select = format!(
            "SELECT {COLUMNS} FROM auditoria
             WHERE {FILTER}
             ORDER BY fecha_creacion DESC, id DESC
             LIMIT $7 OFFSET $8"
        );
        let items = sqlx::query_as::<_, RegistroAuditoria>(&select)
            .bind(q.usuario_id)
            .bind(&q.accion)
            .bind(&q.entidad)
            .bind(q.entidad_id)
            .bind(q.desde)
            .bind(q.hasta)
            .bind(clamp_limit(q.limit))
            .bind(clamp_offset(q.offset))
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM auditoria WHERE {FILTER}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(q.usuario_id)
            .bind(&q.accion)
            .bind(&q.entidad)
            .bind(q.entidad_id)
            .bind(q.desde)
            .bind(q.hasta)
            .fetch_one(pool)
            .await?;

        Ok(AuditPage {
            items,
            total: total.0,
        })
    }
}
