//! Shared response envelope for API handlers.
//!
//! Every successful response uses the uniform
//! `{ "success": true, "data": ..., "message"?: ... }` shape. Use
//! [`Envelope`] instead of ad-hoc `serde_json::json!` to get compile-time
//! type safety and consistent serialization. Error responses are produced
//! by `AppError`'s `IntoResponse` with `success: false`.

use serde::Serialize;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a payload with `success: true` and no message.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Wrap a payload with `success: true` and a human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}
