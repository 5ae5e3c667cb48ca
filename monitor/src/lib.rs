//! TaskPing Monitor - task list completion watcher.
//!
//! This crate observes a directory of task-list files rewritten over time by
//! an external agent, detects when individual tasks transition into the
//! terminal `completed` state, and forwards each completion to the TaskPing
//! relay for SMS delivery.
//!
//! # Overview
//!
//! The monitor keeps a per-file snapshot of the last successfully parsed
//! task collection. Each scan re-reads every eligible file, diffs it against
//! the snapshot, and emits at most one event per detected transition within
//! a single run. Scans are triggered both by filesystem notifications (for
//! latency) and by a fixed-interval poll (for correctness when the watcher
//! misses rapid writes).
//!
//! # Modules
//!
//! - [`types`]: task and transition event types
//! - [`parser`]: task-list file parsing
//! - [`diff`]: snapshot store and diff engine
//! - [`observer`]: dual-trigger directory observer
//! - [`notifier`]: HTTP client for the relay service
//! - [`config`]: configuration from environment variables
//! - [`error`]: error types for monitor operations

pub mod config;
pub mod diff;
pub mod error;
pub mod notifier;
pub mod observer;
pub mod parser;
pub mod types;

pub use config::Config;
pub use diff::{diff, SnapshotStore};
pub use error::{MonitorError, Result};
pub use notifier::{Notifier, NotifierError, NotifyRequest, NotifyResponse};
pub use observer::{DirectoryObserver, ObserverConfig, ObserverError};
pub use parser::{parse_task_file, ParseError};
pub use types::{Task, TaskStatus, TransitionEvent, TransitionKind};
