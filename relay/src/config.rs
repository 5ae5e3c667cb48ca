//! Relay configuration module.
//!
//! Parses configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `PORT` | No | 3456 | HTTP server port |
//! | `TASKPING_SETTINGS_PATH` | No | `./settings.json` | Settings file location |
//! | `TASKPING_TEXTBELT_URL` | No | `https://textbelt.com` | SMS provider base URL |

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::sms::DEFAULT_TEXTBELT_URL;

/// Default HTTP server port.
const DEFAULT_PORT: u16 = 3456;

/// Default settings file location.
const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port number is invalid.
    #[error("invalid port number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Relay configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,

    /// Path to the persisted settings file.
    pub settings_path: PathBuf,

    /// Base URL of the SMS provider.
    pub textbelt_url: String,
}

impl Config {
    /// Parses configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PORT` is set but not a valid u16.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(val) => val.parse::<u16>()?,
            Err(_) => DEFAULT_PORT,
        };

        let settings_path = env::var("TASKPING_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH));

        let textbelt_url = env::var("TASKPING_TEXTBELT_URL")
            .unwrap_or_else(|_| DEFAULT_TEXTBELT_URL.to_string());

        Ok(Self {
            port,
            settings_path,
            textbelt_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_matches_the_monitor_default_relay_url() {
        assert_eq!(DEFAULT_PORT, 3456);
    }
}
