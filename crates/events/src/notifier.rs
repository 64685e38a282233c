//! Notification writer service.
//!
//! [`NotificationWriter`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and turns lifecycle events into rows in `notificaciones` for the user the
//! event concerns: submission events notify the assigned tutor, review
//! outcomes notify the owning student. It runs as a long-lived background
//! task and shuts down when the bus sender is dropped.

use thesia_core::types::DbId;
use thesia_db::models::notificacion::CreateNotificacion;
use thesia_db::repositories::{NotificacionRepo, ProyectoRepo};
use thesia_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{
    DomainEvent, EVENTO_OBSERVACION_CREADA, EVENTO_PROYECTO_APROBADO, EVENTO_PROYECTO_CORREGIR,
    EVENTO_PROYECTO_ENVIADO, EVENTO_PROYECTO_EN_REVISION, EVENTO_PROYECTO_RECHAZADO,
    EVENTO_TUTOR_ASIGNADO,
};

/// Background service that persists notifications derived from domain events.
pub struct NotificationWriter;

impl NotificationWriter {
    /// Run the writer loop.
    ///
    /// The loop exits when the channel is closed (i.e. the bus is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::handle(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to write notification for event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification writer lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification writer shutting down");
                    break;
                }
            }
        }
    }

    /// Resolve the recipient and message for one event and insert the row.
    ///
    /// Events without a resolvable recipient (e.g. a submission on a project
    /// with no tutor yet) are skipped silently.
    async fn handle(pool: &DbPool, event: &DomainEvent) -> Result<(), sqlx::Error> {
        let Some(proyecto_id) = event.proyecto_id else {
            return Ok(());
        };
        let Some(proyecto) = ProyectoRepo::find_by_id(pool, proyecto_id).await? else {
            return Ok(());
        };

        let (destinatario, titulo, mensaje): (Option<DbId>, &str, String) =
            match event.event_type.as_str() {
                EVENTO_PROYECTO_ENVIADO => (
                    proyecto.tutor_id,
                    "Proyecto enviado",
                    format!("El proyecto \"{}\" fue enviado para revisión", proyecto.titulo),
                ),
                EVENTO_PROYECTO_EN_REVISION => (
                    Some(proyecto.estudiante_id),
                    "Proyecto en revisión",
                    format!("Tu proyecto \"{}\" está en revisión", proyecto.titulo),
                ),
                EVENTO_PROYECTO_APROBADO => (
                    Some(proyecto.estudiante_id),
                    "Proyecto aprobado",
                    format!("Tu proyecto \"{}\" fue aprobado", proyecto.titulo),
                ),
                EVENTO_PROYECTO_RECHAZADO => (
                    Some(proyecto.estudiante_id),
                    "Proyecto rechazado",
                    format!("Tu proyecto \"{}\" fue rechazado", proyecto.titulo),
                ),
                EVENTO_PROYECTO_CORREGIR => (
                    Some(proyecto.estudiante_id),
                    "Correcciones solicitadas",
                    format!(
                        "Tu proyecto \"{}\" tiene nuevas observaciones por corregir",
                        proyecto.titulo
                    ),
                ),
                EVENTO_TUTOR_ASIGNADO => (
                    proyecto.tutor_id,
                    "Proyecto asignado",
                    format!("Se te asignó el proyecto \"{}\"", proyecto.titulo),
                ),
                EVENTO_OBSERVACION_CREADA => (
                    Some(proyecto.estudiante_id),
                    "Nueva observación",
                    format!("Tu proyecto \"{}\" recibió una observación", proyecto.titulo),
                ),
                other => {
                    tracing::debug!(event_type = %other, "No notification rule for event");
                    (None, "", String::new())
                }
            };

        if let Some(usuario_id) = destinatario {
            NotificacionRepo::create(
                pool,
                &CreateNotificacion {
                    usuario_id,
                    titulo: titulo.to_string(),
                    mensaje,
                    proyecto_id: Some(proyecto_id),
                },
            )
            .await?;
        }

        Ok(())
    }
}
