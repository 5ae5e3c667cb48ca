//! Directory observer for task-list files.
//!
//! Watches a directory of `*.json` task-list files and drives the snapshot
//! diff engine. Two independent trigger sources converge on one consumer:
//!
//! - a `notify` filesystem watcher (low latency, may miss rapid successive
//!   writes depending on the platform backend)
//! - a fixed-interval poll (high latency, guaranteed eventual consistency)
//!
//! Both push triggers into a single mpsc queue drained by one task, so scan
//! runs never overlap and the [`SnapshotStore`] needs no locking. The poll
//! is the correctness backstop; the watcher only improves latency. A change
//! notification schedules a scan after a short fixed delay so an in-progress
//! write can finish; notifications inside the delay window are not further
//! coalesced, which is harmless because re-scanning unchanged content diffs
//! to nothing.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use tokio::sync::mpsc;
//! use taskping_monitor::diff::SnapshotStore;
//! use taskping_monitor::observer::{DirectoryObserver, ObserverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (tx, mut rx) = mpsc::channel(100);
//!     let observer = DirectoryObserver::new(
//!         PathBuf::from("/home/user/.claude/todos"),
//!         SnapshotStore::new(),
//!         tx,
//!         ObserverConfig::default(),
//!     )?;
//!
//!     while let Some(event) = rx.recv().await {
//!         println!("completed: {}", event.task.content);
//!     }
//!
//!     drop(observer);
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::diff::SnapshotStore;
use crate::parser::parse_task_file;
use crate::types::{TransitionEvent, TransitionKind};

/// Capacity of the internal trigger queue.
const TRIGGER_QUEUE_CAPACITY: usize = 256;

/// Errors that can occur while setting up the observer.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The watched directory does not exist. Fatal at startup: there is
    /// nothing to observe.
    #[error("task directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Failed to initialize the file system watcher.
    #[error("failed to create watcher: {0}")]
    WatcherInit(#[from] notify::Error),
}

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Configuration for the directory observer.
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    /// Interval of the polling backstop.
    pub poll_interval: Duration,

    /// Delay between a change notification and the scheduled scan, giving
    /// an in-progress write time to complete.
    pub notify_delay: Duration,

    /// Trailing window in which a file modification counts as activity.
    pub activity_window: Duration,

    /// Interval of the advisory status log.
    pub status_interval: Duration,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            notify_delay: Duration::from_millis(100),
            activity_window: Duration::from_secs(5 * 60),
            status_interval: Duration::from_secs(30),
        }
    }
}

/// A scan trigger from one of the two producer sources.
#[derive(Debug)]
enum Trigger {
    /// Fixed-interval poll fired.
    Poll,
    /// The watcher reported a change to an eligible file.
    FileChanged(PathBuf),
}

/// Observer that keeps the snapshot store fresh and forwards events.
///
/// Holds the watch subscription and the background task handles; dropping
/// the observer releases the watch handle and stops the tasks.
#[derive(Debug)]
pub struct DirectoryObserver {
    /// Kept alive to maintain the watch subscription.
    #[allow(dead_code)]
    watcher: RecommendedWatcher,

    tasks_dir: PathBuf,
    poll_handle: tokio::task::JoinHandle<()>,
    scheduler_handle: tokio::task::JoinHandle<()>,
    consumer_handle: tokio::task::JoinHandle<()>,
}

impl DirectoryObserver {
    /// Creates an observer for `tasks_dir` and starts its background tasks.
    ///
    /// Takes ownership of the [`SnapshotStore`]; its lifecycle is tied to
    /// this monitoring session. Every `Completed` event is forwarded into
    /// `event_tx`; `Reverted` events are logged and never forwarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or the filesystem
    /// watcher cannot be initialized.
    pub fn new(
        tasks_dir: PathBuf,
        store: SnapshotStore,
        event_tx: mpsc::Sender<TransitionEvent>,
        config: ObserverConfig,
    ) -> Result<Self> {
        if !tasks_dir.is_dir() {
            return Err(ObserverError::DirectoryNotFound(tasks_dir));
        }

        info!(
            tasks_dir = %tasks_dir.display(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "Initializing directory observer"
        );

        let (trigger_tx, trigger_rx) = mpsc::channel::<Trigger>(TRIGGER_QUEUE_CAPACITY);
        let (notify_tx, notify_rx) = mpsc::channel::<PathBuf>(TRIGGER_QUEUE_CAPACITY);

        let watcher = create_watcher(tasks_dir.clone(), notify_tx)?;

        // Producer 1: the polling backstop.
        let poll_tx = trigger_tx.clone();
        let poll_interval = config.poll_interval;
        let poll_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                // A dropped poll trigger is fine, the next tick repeats it.
                let _ = poll_tx.try_send(Trigger::Poll);
            }
        });

        // Producer 2: change notifications, each delayed by notify_delay.
        let notify_delay = config.notify_delay;
        let scheduler_handle = tokio::spawn(schedule_notifications(
            notify_rx,
            trigger_tx,
            notify_delay,
        ));

        // The single consumer owns the store.
        let consumer_handle = tokio::spawn(run_scan_loop(
            tasks_dir.clone(),
            store,
            trigger_rx,
            event_tx,
            config,
        ));

        Ok(Self {
            watcher,
            tasks_dir,
            poll_handle,
            scheduler_handle,
            consumer_handle,
        })
    }

    /// Returns the directory being observed.
    #[must_use]
    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }
}

impl Drop for DirectoryObserver {
    fn drop(&mut self) {
        self.poll_handle.abort();
        self.scheduler_handle.abort();
        self.consumer_handle.abort();
    }
}

/// Creates the filesystem watcher feeding the notification channel.
///
/// The notify callback runs on the watcher's own thread, so it only filters
/// and forwards; all file I/O happens in the consumer task.
fn create_watcher(
    tasks_dir: PathBuf,
    notify_tx: mpsc::Sender<PathBuf>,
) -> Result<RecommendedWatcher> {
    let watch_dir = tasks_dir.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: std::result::Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!(error = %e, "File watcher error");
                    return;
                }
            };

            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }

            for path in event.paths {
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if path.parent() != Some(tasks_dir.as_path()) {
                    continue;
                }
                trace!(path = %path.display(), "Task file changed");
                if notify_tx.try_send(path).is_err() {
                    // Queue full or closed; the poll backstop covers us.
                    debug!("Dropped change notification");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    debug!(watch_dir = %watch_dir.display(), "Started watching task directory");

    Ok(watcher)
}

/// Turns raw change notifications into delayed scan triggers.
///
/// Each notification spawns its own delay so that a burst of writes is not
/// serialized behind one timer. Debounce, not drop: duplicates within the
/// window each schedule a scan, and the redundant scans diff to nothing.
async fn schedule_notifications(
    mut notify_rx: mpsc::Receiver<PathBuf>,
    trigger_tx: mpsc::Sender<Trigger>,
    delay: Duration,
) {
    while let Some(path) = notify_rx.recv().await {
        let tx = trigger_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.try_send(Trigger::FileChanged(path));
        });
    }
}

/// Drains the trigger queue, scanning the directory once per trigger.
///
/// This is the only place the store is mutated, which preserves the
/// no-concurrent-diff invariant without locks.
async fn run_scan_loop(
    tasks_dir: PathBuf,
    mut store: SnapshotStore,
    mut trigger_rx: mpsc::Receiver<Trigger>,
    event_tx: mpsc::Sender<TransitionEvent>,
    config: ObserverConfig,
) {
    let mut mtimes: HashMap<PathBuf, SystemTime> = HashMap::new();
    let mut status_interval = tokio::time::interval(config.status_interval);
    status_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; skip it so the startup log stays clean.
    status_interval.tick().await;

    debug!("Starting scan loop");

    loop {
        tokio::select! {
            trigger = trigger_rx.recv() => {
                let Some(trigger) = trigger else {
                    debug!("Trigger queue closed, stopping scan loop");
                    break;
                };
                trace!(trigger = ?trigger, "Scanning task directory");
                scan_once(&tasks_dir, &mut store, &mut mtimes, &event_tx).await;
            }

            _ = status_interval.tick() => {
                if session_active(&store, &mtimes, config.activity_window) {
                    info!("Monitoring active session");
                }
            }
        }
    }
}

/// Reads every eligible file once and applies it to the store.
///
/// Per-file I/O and parse failures are swallowed: the file is skipped for
/// this cycle and its stored snapshot is untouched, so a partial write never
/// corrupts the diff baseline.
async fn scan_once(
    tasks_dir: &Path,
    store: &mut SnapshotStore,
    mtimes: &mut HashMap<PathBuf, SystemTime>,
    event_tx: &mpsc::Sender<TransitionEvent>,
) {
    let entries = match fs::read_dir(tasks_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, dir = %tasks_dir.display(), "Failed to list task directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let tasks = match parse_task_file(&content) {
            Ok(tasks) => tasks,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unparsable file");
                continue;
            }
        };

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            mtimes.insert(path.clone(), modified);
        }

        let file_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        for event in store.apply(&file_id, tasks) {
            match event.kind {
                TransitionKind::Completed => {
                    info!(
                        source_file = %event.source_file,
                        task = %event.task.content,
                        "Task completed"
                    );
                    if event_tx.send(event).await.is_err() {
                        warn!("Event channel closed, dropping transition event");
                        return;
                    }
                }
                TransitionKind::Reverted => {
                    // Reversions are noteworthy but not notification-worthy.
                    info!(
                        source_file = %event.source_file,
                        task = %event.task.content,
                        "Task reverted to pending"
                    );
                }
            }
        }
    }
}

/// Advisory liveness predicate: a session counts as active when any stored
/// task is `in_progress` or any observed file changed within the window.
fn session_active(
    store: &SnapshotStore,
    mtimes: &HashMap<PathBuf, SystemTime>,
    window: Duration,
) -> bool {
    if store.any_in_progress() {
        return true;
    }

    let now = SystemTime::now();
    mtimes.values().any(|mtime| {
        now.duration_since(*mtime)
            .map(|age| age <= window)
            .unwrap_or(true)
    })
}
