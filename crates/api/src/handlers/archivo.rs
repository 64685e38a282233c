//! Handlers for project file upload, download, and removal.
//!
//! Metadata lives in the `archivos` table; bytes are written to the
//! configured storage directory under a server-generated name, so client
//! file names never touch the filesystem.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use thesia_core::error::CoreError;
use thesia_core::roles::ROL_ADMINISTRADOR;
use thesia_core::types::DbId;
use thesia_db::models::archivo::{Archivo, CreateArchivo};
use thesia_db::repositories::{ArchivoRepo, ProyectoRepo};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::proyecto::{cargar_proyecto_visible, es_propietario, es_tutor_asignado};
use crate::handlers::registrar_auditoria;
use crate::middleware::auth::AuthUser;
use crate::response::Envelope;
use crate::state::AppState;

/// Fallback MIME type when the client does not send one.
const DEFAULT_MIME: &str = "application/octet-stream";

/// GET /api/v1/proyectos/{id}/archivos
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(proyecto_id): Path<DbId>,
) -> AppResult<Json<Envelope<Vec<Archivo>>>> {
    cargar_proyecto_visible(&state, proyecto_id, &user).await?;
    let archivos = ArchivoRepo::list_by_proyecto(&state.pool, proyecto_id).await?;
    Ok(Json(Envelope::data(archivos)))
}

/// POST /api/v1/proyectos/{id}/archivos
///
/// Multipart upload of a single file by the owning student or the assigned
/// tutor. One blocking request per file; no chunking or resumability.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    Path(proyecto_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Envelope<Archivo>>)> {
    let proyecto = cargar_proyecto_visible(&state, proyecto_id, &user).await?;
    if !es_propietario(&proyecto, &user) && !es_tutor_asignado(&proyecto, &user) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owning student or the assigned tutor may upload files".into(),
        )));
    }

    // First file field wins; anything else in the form is ignored.
    let field = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?;
        match field {
            Some(f) if f.file_name().is_some() => break f,
            Some(_) => continue,
            None => {
                return Err(AppError::Core(CoreError::Validation(
                    "The upload must contain a file field".into(),
                )))
            }
        }
    };

    let nombre_original = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Core(CoreError::Validation("File name must not be empty".into())))?;
    let tipo_mime = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_MIME.to_string());

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "The uploaded file is empty".into(),
        )));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::Core(CoreError::Validation(format!(
            "File exceeds the maximum upload size of {} bytes",
            state.config.max_upload_bytes
        ))));
    }

    // Server-generated storage name; the original extension is kept for
    // convenience, nothing else of the client name reaches the disk.
    let nombre_almacenado = match nombre_original.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 10 => {
            format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase())
        }
        _ => Uuid::new_v4().to_string(),
    };

    tokio::fs::create_dir_all(&state.config.storage_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Storage directory error: {e}")))?;
    let destino = state.config.storage_dir.join(&nombre_almacenado);
    tokio::fs::write(&destino, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store file: {e}")))?;

    let archivo = ArchivoRepo::create(
        &state.pool,
        &CreateArchivo {
            proyecto_id,
            nombre_original,
            nombre_almacenado,
            tipo_mime,
            tamano: bytes.len() as i64,
            subido_por: user.usuario_id,
        },
    )
    .await?;

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "archivo.subir",
        "archivo",
        Some(archivo.id),
        Some(serde_json::json!({ "proyecto_id": proyecto_id, "tamano": archivo.tamano })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(Envelope::data(archivo))))
}

/// GET /api/v1/archivos/{id}/descargar
///
/// Streams the stored bytes with the original file name.
pub async fn descargar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let archivo = ArchivoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Archivo",
            id,
        }))?;
    // Project access gates the download.
    cargar_proyecto_visible(&state, archivo.proyecto_id, &user).await?;

    let ruta = state.config.storage_dir.join(&archivo.nombre_almacenado);
    let file = tokio::fs::File::open(&ruta)
        .await
        .map_err(|e| AppError::InternalError(format!("Stored file unavailable: {e}")))?;

    let headers = [
        (header::CONTENT_TYPE, archivo.tipo_mime.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                archivo.nombre_original.replace('"', "")
            ),
        ),
    ];
    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body))
}

/// DELETE /api/v1/archivos/{id}
///
/// The uploader or an administrator removes the file. Metadata is deleted
/// first; removing the bytes is best-effort.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let archivo = ArchivoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Archivo",
            id,
        }))?;

    if archivo.subido_por != user.usuario_id && user.rol != ROL_ADMINISTRADOR {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the uploader or an administrator may delete this file".into(),
        )));
    }

    ArchivoRepo::delete(&state.pool, id).await?;

    let ruta = state.config.storage_dir.join(&archivo.nombre_almacenado);
    if let Err(e) = tokio::fs::remove_file(&ruta).await {
        tracing::warn!(error = %e, archivo_id = id, "Stored file could not be removed");
    }

    registrar_auditoria(
        &state,
        Some(user.usuario_id),
        "archivo.eliminar",
        "archivo",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
