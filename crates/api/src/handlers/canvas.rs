//! SSE streaming handler for thesis-section generation.
//!
//! `EventSource` cannot set request headers, so these endpoints
//! authenticate with the access token passed as a query parameter instead
//! of the `Authorization` header.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use thesia_core::error::CoreError;
use thesia_core::proposal::validate_seccion;
use thesia_core::roles::{ROL_ESTUDIANTE, ROL_TUTOR};
use thesia_core::types::DbId;
use thesia_db::repositories::ProyectoRepo;

use crate::assistant::SectionRequest;
use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for `GET /canvas/generar-seccion-stream`.
#[derive(Debug, Deserialize)]
pub struct GenerarSeccionParams {
    pub proyecto_id: DbId,
    pub seccion: String,
    /// Access token; query-passed because EventSource cannot set headers.
    pub token: String,
}

/// GET /api/v1/canvas/generar-seccion-stream
///
/// Streams provider chunks as SSE `data:` events, ending with `[DONE]`.
/// A provider failure mid-stream emits `[ERROR]` and ends the stream; the
/// client treats it as terminal (nothing is retried).
pub async fn generar_seccion_stream(
    State(state): State<AppState>,
    Query(params): Query<GenerarSeccionParams>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let claims = validate_token(&params.token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    validate_seccion(&params.seccion)?;

    let proyecto = ProyectoRepo::find_by_id(&state.pool, params.proyecto_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proyecto",
            id: params.proyecto_id,
        }))?;

    let es_propietario = claims.rol == ROL_ESTUDIANTE && proyecto.estudiante_id == claims.sub;
    let es_tutor = claims.rol == ROL_TUTOR && proyecto.tutor_id == Some(claims.sub);
    if !es_propietario && !es_tutor {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this project".into(),
        )));
    }

    let request = SectionRequest {
        seccion: params.seccion,
        titulo: proyecto.titulo,
        descripcion: proyecto.descripcion,
    };
    let chunks = state.assistant.stream_section(&request).await?;

    let events = chunks
        .map(|chunk| match chunk {
            Ok(texto) => Ok(Event::default().data(texto)),
            Err(e) => {
                tracing::error!(error = %e, "Assistant stream failed mid-generation");
                Ok(Event::default().data("[ERROR]"))
            }
        })
        .chain(futures::stream::once(async {
            Ok(Event::default().data("[DONE]"))
        }));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
