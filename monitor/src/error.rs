//! Error types for the TaskPing monitor.

use thiserror::Error;

use crate::config::ConfigError;
use crate::observer::ObserverError;
use crate::parser::ParseError;

/// Errors that can occur during monitor operations.
///
/// This is the primary error type for the monitor crate. Most runtime
/// failures (unreadable files, malformed content, failed deliveries) are
/// absorbed where they occur; this type covers the setup paths that are
/// allowed to fail loudly.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Observer setup error (missing directory, watcher init).
    #[error("observer error: {0}")]
    Observer(#[from] ObserverError),

    /// Task file parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
