//! Persisted notification settings.
//!
//! Settings live in a single JSON file next to the relay. A missing file is
//! not an error: defaults are written out and returned, so a fresh install
//! works without any setup step. The file is small and reloaded on every
//! request, which keeps the handlers free of shared mutable state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default SMS provider identifier.
const DEFAULT_PROVIDER: &str = "textbelt";

/// Errors that can occur while reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize settings.
    #[error("settings serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Master switch; when false every delivery returns a structured
    /// negative result.
    pub enabled: bool,

    /// Destination phone number. Empty means not configured.
    pub phone_number: String,

    /// SMS provider identifier.
    pub provider: String,

    /// Provider API key.
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            phone_number: String::new(),
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: DEFAULT_PROVIDER.to_string(),
        }
    }
}

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, creating the file with defaults if it is absent.
    ///
    /// A file that exists but fails to parse also falls back to defaults
    /// (with a warning) rather than taking the relay down; the next save
    /// rewrites it in canonical form.
    ///
    /// # Errors
    ///
    /// Returns an error only if the defaults cannot be written out.
    pub async fn load(&self) -> Result<Settings, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => Ok(settings),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Settings file is malformed, using defaults"
                    );
                    Ok(Settings::default())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Creating default settings file");
                let defaults = Settings::default();
                self.save(&defaults).await?;
                Ok(defaults)
            }
            Err(e) => Err(SettingsError::Io(e)),
        }
    }

    /// Persists the settings, pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_yields_defaults_and_creates_it() {
        let (_dir, store) = temp_store();

        let settings = store.load().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.enabled);
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let (_dir, store) = temp_store();

        let settings = Settings {
            enabled: true,
            phone_number: "+15551234567".to_string(),
            provider: "textbelt".to_string(),
            api_key: "secret".to_string(),
        };
        store.save(&settings).await.unwrap();

        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn settings_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json.get("phoneNumber").is_some());
        assert!(json.get("apiKey").is_some());
    }

    #[tokio::test]
    async fn partial_file_fills_in_defaults() {
        let (_dir, store) = temp_store();
        tokio::fs::write(store.path(), r#"{"enabled": true}"#)
            .await
            .unwrap();

        let settings = store.load().await.unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.provider, "textbelt");
    }

    #[tokio::test]
    async fn malformed_file_falls_back_to_defaults() {
        let (_dir, store) = temp_store();
        tokio::fs::write(store.path(), "not json").await.unwrap();

        let settings = store.load().await.unwrap();
        assert_eq!(settings, Settings::default());
    }
}
