//! TaskPing Relay - SMS notification webhook service.
//!
//! This crate provides the delivery side of TaskPing: a small HTTP service
//! that receives task-completion calls from the monitor, condenses the text
//! into the 160-character SMS budget, and forwards it to the TextBelt
//! provider. Settings (enabled flag, destination number, API key) persist
//! in a single JSON file.
//!
//! # Modules
//!
//! - [`condense`]: deterministic length-bounded message condensation
//! - [`settings`]: file-backed settings record
//! - [`sms`]: TextBelt transport client
//! - [`routes`]: HTTP API endpoints
//! - [`config`]: configuration from environment variables
//! - [`error`]: handler error types

pub mod condense;
pub mod config;
pub mod error;
pub mod routes;
pub mod settings;
pub mod sms;

pub use condense::{compose_sms, condense, SMS_MAX_LEN};
pub use config::Config;
pub use error::RelayError;
pub use routes::{create_router, AppState};
pub use settings::{Settings, SettingsError, SettingsStore};
pub use sms::{SmsClient, SmsResult};
