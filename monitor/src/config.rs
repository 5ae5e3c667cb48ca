//! Configuration module for the TaskPing monitor.
//!
//! Configuration comes from environment variables; the CLI can override
//! individual values.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TASKPING_TASKS_DIR` | No | `~/.claude/todos` | Directory of task-list files |
//! | `TASKPING_RELAY_URL` | No | `http://localhost:3456` | Base URL of the relay service |
//! | `TASKPING_POLL_INTERVAL_MS` | No | 2000 | Polling backstop interval (must be > 0) |

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Default relay base URL.
const DEFAULT_RELAY_URL: &str = "http://localhost:3456";

/// Default polling interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default task directory relative to home.
const DEFAULT_TASKS_DIR: &str = ".claude/todos";

/// Errors that can occur during configuration parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for the TaskPing monitor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of task-list files to observe.
    pub tasks_dir: PathBuf,

    /// Base URL of the relay service.
    pub relay_url: String,

    /// Polling backstop interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `TASKPING_POLL_INTERVAL_MS` is not a
    /// positive integer, or the home directory cannot be determined while
    /// the default task directory is needed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tasks_dir = match env::var("TASKPING_TASKS_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => BaseDirs::new()
                .ok_or(ConfigError::NoHomeDirectory)?
                .home_dir()
                .join(DEFAULT_TASKS_DIR),
        };

        let relay_url =
            env::var("TASKPING_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());

        let poll_interval_ms = match env::var("TASKPING_POLL_INTERVAL_MS") {
            Ok(val) => {
                let ms = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "TASKPING_POLL_INTERVAL_MS".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if ms == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TASKPING_POLL_INTERVAL_MS".to_string(),
                        message: "poll interval must be greater than 0".to_string(),
                    });
                }
                ms
            }
            Err(_) => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            tasks_dir,
            relay_url,
            poll_interval_ms,
        })
    }
}
