//! Handlers for the assistant chat: conversations, messages, and file
//! attachments.
//!
//! The assistant reply comes from the external provider behind the
//! [`CompletionProvider`](crate::assistant::CompletionProvider) seam. One
//! in-flight provider call per request; if the client drops the
//! connection, axum drops this future and the call is aborted with it.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use thesia_core::error::CoreError;
use thesia_core::types::DbId;
use thesia_db::models::chat::{
    Conversacion, Mensaje, MENSAJE_ROL_ASSISTANT, MENSAJE_ROL_USER,
};
use thesia_db::repositories::ChatRepo;
use uuid::Uuid;

use crate::assistant::ProviderMessage;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::Envelope;
use crate::state::AppState;

/// Conversation titles derived from the first message are cut here.
const MAX_TITULO_CHARS: usize = 60;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /chat/mensaje`.
///
/// Without `conversacion_id` a new conversation is started, titled after
/// the message.
#[derive(Debug, Deserialize)]
pub struct EnviarMensajeRequest {
    pub conversacion_id: Option<DbId>,
    pub mensaje: String,
}

/// Request body for `POST /chat/conversaciones`.
#[derive(Debug, Deserialize)]
pub struct CreateConversacionRequest {
    pub titulo: String,
}

/// Query parameters for `GET /chat/historial`.
#[derive(Debug, Deserialize)]
pub struct HistorialParams {
    pub conversacion_id: DbId,
}

/// Payload returned by `POST /chat/mensaje`.
#[derive(Debug, Serialize)]
pub struct RespuestaData {
    pub conversacion_id: DbId,
    pub mensaje: Mensaje,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a conversation and enforce that it belongs to the user.
async fn cargar_conversacion(
    state: &AppState,
    id: DbId,
    user: &AuthUser,
) -> AppResult<Conversacion> {
    let conversacion = ChatRepo::find_conversacion(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Conversacion",
            id,
        }))?;
    if conversacion.usuario_id != user.usuario_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "This conversation belongs to another user".into(),
        )));
    }
    Ok(conversacion)
}

fn titulo_desde_mensaje(mensaje: &str) -> String {
    let trimmed = mensaje.trim();
    if trimmed.chars().count() <= MAX_TITULO_CHARS {
        trimmed.to_string()
    } else {
        trimmed.chars().take(MAX_TITULO_CHARS).collect()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/chat/mensaje
///
/// Appends the user message, asks the provider for a reply with the full
/// conversation history, appends and returns the reply. No retry: a
/// provider failure is terminal for this action.
pub async fn enviar_mensaje(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EnviarMensajeRequest>,
) -> AppResult<Json<Envelope<RespuestaData>>> {
    let texto = input.mensaje.trim();
    if texto.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message must not be empty".into(),
        )));
    }

    let conversacion = match input.conversacion_id {
        Some(id) => cargar_conversacion(&state, id, &user).await?,
        None => {
            ChatRepo::create_conversacion(&state.pool, user.usuario_id, &titulo_desde_mensaje(texto))
                .await?
        }
    };

    ChatRepo::add_mensaje(&state.pool, conversacion.id, MENSAJE_ROL_USER, texto).await?;

    let historial = ChatRepo::list_mensajes(&state.pool, conversacion.id).await?;
    let mensajes: Vec<ProviderMessage> = historial
        .iter()
        .map(|m| ProviderMessage {
            rol: m.rol.clone(),
            contenido: m.contenido.clone(),
        })
        .collect();

    let respuesta = state.assistant.complete(&mensajes).await?;

    let mensaje =
        ChatRepo::add_mensaje(&state.pool, conversacion.id, MENSAJE_ROL_ASSISTANT, &respuesta)
            .await?;

    Ok(Json(Envelope::data(RespuestaData {
        conversacion_id: conversacion.id,
        mensaje,
    })))
}

/// GET /api/v1/chat/historial?conversacion_id=
pub async fn historial(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistorialParams>,
) -> AppResult<Json<Envelope<Vec<Mensaje>>>> {
    cargar_conversacion(&state, params.conversacion_id, &user).await?;
    let mensajes = ChatRepo::list_mensajes(&state.pool, params.conversacion_id).await?;
    Ok(Json(Envelope::data(mensajes)))
}

/// GET /api/v1/chat/conversaciones
pub async fn list_conversaciones(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Envelope<Vec<Conversacion>>>> {
    let conversaciones = ChatRepo::list_conversaciones(&state.pool, user.usuario_id).await?;
    Ok(Json(Envelope::data(conversaciones)))
}

/// POST /api/v1/chat/conversaciones
pub async fn create_conversacion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateConversacionRequest>,
) -> AppResult<(StatusCode, Json<Envelope<Conversacion>>)> {
    let titulo = input.titulo.trim();
    if titulo.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Conversation title must not be empty".into(),
        )));
    }
    let conversacion = ChatRepo::create_conversacion(&state.pool, user.usuario_id, titulo).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(conversacion))))
}

/// DELETE /api/v1/chat/conversaciones/{id}
pub async fn delete_conversacion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    cargar_conversacion(&state, id, &user).await?;
    ChatRepo::delete_conversacion(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chat/upload
///
/// Attaches a file to a conversation: the bytes are stored alongside
/// project files and the attachment is recorded as a user message.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Envelope<RespuestaData>>)> {
    let mut conversacion_id: Option<DbId> = None;
    let mut archivo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("conversacion_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid field: {e}")))?;
                conversacion_id = Some(value.trim().parse().map_err(|_| {
                    AppError::Core(CoreError::Validation(
                        "conversacion_id must be an integer".into(),
                    ))
                })?);
            }
            _ if field.file_name().is_some() => {
                let nombre = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        AppError::Core(CoreError::Validation("File name must not be empty".into()))
                    })?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
                archivo = Some((nombre, bytes.to_vec()));
            }
            _ => continue,
        }
    }

    let conversacion_id = conversacion_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation("conversacion_id is required".into()))
    })?;
    let (nombre, bytes) = archivo.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "The upload must contain a file field".into(),
        ))
    })?;
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::Core(CoreError::Validation(format!(
            "File exceeds the maximum upload size of {} bytes",
            state.config.max_upload_bytes
        ))));
    }

    cargar_conversacion(&state, conversacion_id, &user).await?;

    let chat_dir = state.config.storage_dir.join("chat");
    tokio::fs::create_dir_all(&chat_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Storage directory error: {e}")))?;
    let destino = chat_dir.join(Uuid::new_v4().to_string());
    tokio::fs::write(&destino, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store file: {e}")))?;

    let mensaje = ChatRepo::add_mensaje(
        &state.pool,
        conversacion_id,
        MENSAJE_ROL_USER,
        &format!("[Archivo adjunto: {nombre}]"),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(RespuestaData {
            conversacion_id,
            mensaje,
        })),
    ))
}
