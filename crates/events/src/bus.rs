//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DomainEvent`]s. It is
//! shared via `Arc<EventBus>` across the application; handlers publish,
//! the notification writer subscribes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thesia_core::types::DbId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const EVENTO_PROYECTO_ENVIADO: &str = "proyecto.enviado";
pub const EVENTO_PROYECTO_EN_REVISION: &str = "proyecto.en_revision";
pub const EVENTO_PROYECTO_APROBADO: &str = "proyecto.aprobado";
pub const EVENTO_PROYECTO_RECHAZADO: &str = "proyecto.rechazado";
pub const EVENTO_PROYECTO_CORREGIR: &str = "proyecto.corregir";
pub const EVENTO_TUTOR_ASIGNADO: &str = "proyecto.tutor_asignado";
pub const EVENTO_OBSERVACION_CREADA: &str = "observacion.creada";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_proyecto`](DomainEvent::with_proyecto),
/// [`with_actor`](DomainEvent::with_actor), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"proyecto.enviado"`.
    pub event_type: String,

    /// Project the event refers to, when applicable.
    pub proyecto_id: Option<DbId>,

    /// Id of the user that triggered the event.
    pub actor_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            proyecto_id: None,
            actor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the subject project to the event.
    pub fn with_proyecto(mut self, proyecto_id: DbId) -> Self {
        self.proyecto_id = Some(proyecto_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, usuario_id: DbId) -> Self {
        self.actor_id = Some(usuario_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = EventBus::default();
        let mut rx_a = bus.subscribe();
        let mut rx_b = bus.subscribe();

        bus.publish(
            DomainEvent::new(EVENTO_PROYECTO_ENVIADO)
                .with_proyecto(7)
                .with_actor(3),
        );

        let a = rx_a.recv().await.unwrap();
        let b = rx_b.recv().await.unwrap();
        assert_eq!(a.event_type, EVENTO_PROYECTO_ENVIADO);
        assert_eq!(a.proyecto_id, Some(7));
        assert_eq!(b.actor_id, Some(3));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        // Must not panic or error.
        bus.publish(DomainEvent::new(EVENTO_PROYECTO_APROBADO));
    }

    #[tokio::test]
    async fn test_subscriber_sees_events_after_subscribing_only() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new("antes"));

        let mut rx = bus.subscribe();
        bus.publish(DomainEvent::new("despues"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "despues");
    }
}
