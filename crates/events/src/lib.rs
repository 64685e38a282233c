//! In-process domain events and the notification writer that consumes them.

pub mod bus;
pub mod notifier;

pub use bus::{DomainEvent, EventBus};
pub use notifier::NotificationWriter;
