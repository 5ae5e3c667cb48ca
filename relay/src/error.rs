//! Error types for the TaskPing relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::settings::SettingsError;

/// Errors surfaced by route handlers.
///
/// Delivery failures and disabled notifications are NOT errors; they are
/// structured `{success: false}` results. This type covers the genuinely
/// broken cases, which map to HTTP 500.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The settings file could not be read or written.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
