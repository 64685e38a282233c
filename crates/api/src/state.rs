use std::sync::Arc;

use crate::assistant::CompletionProvider;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: thesia_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<thesia_events::EventBus>,
    /// External assistant provider (chat and thesis-section generation).
    pub assistant: Arc<dyn CompletionProvider>,
}
