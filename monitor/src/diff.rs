//! Snapshot diff engine.
//!
//! The engine reconciles consecutive reads of the same task-list file and
//! emits a [`TransitionEvent`] for each status change matching a tracked
//! pattern. Snapshots live in a [`SnapshotStore`] owned by the caller and
//! mutated only by the single scan routine, so no locking is needed.
//!
//! # Diff rules
//!
//! Tasks are matched by `id` between the previous and current collections:
//!
//! - matched, previous status ≠ `completed`, current = `completed` → `Completed`
//! - matched, previous = `in_progress`, current = `pending` → `Reverted`
//! - unmatched (new task), current = `completed` → `Completed`
//! - present only in the previous collection → no event
//!
//! The first observation of a file diffs against an empty collection, so a
//! task that is already `completed` on first read is reported. Events are
//! produced in the iteration order of the current collection.

use std::collections::HashMap;

use tracing::trace;

use crate::types::{Task, TaskStatus, TransitionEvent, TransitionKind};

/// Computes the transition events between two reads of one source file.
///
/// `previous` is `None` on the first observation of a file, which is treated
/// as an empty collection: every task already `completed` in `current` is
/// reported as [`TransitionKind::Completed`].
///
/// # Example
///
/// ```
/// use taskping_monitor::diff::diff;
/// use taskping_monitor::types::{Task, TaskStatus, TransitionKind};
///
/// let before = vec![Task {
///     id: "1".into(),
///     content: "Fix bug".into(),
///     status: TaskStatus::InProgress,
/// }];
/// let after = vec![Task {
///     id: "1".into(),
///     content: "Fix bug".into(),
///     status: TaskStatus::Completed,
/// }];
///
/// let events = diff("a.json", Some(&before), &after);
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].kind, TransitionKind::Completed);
/// ```
#[must_use]
pub fn diff(source_file: &str, previous: Option<&[Task]>, current: &[Task]) -> Vec<TransitionEvent> {
    let previous = previous.unwrap_or(&[]);

    let mut events = Vec::new();

    for task in current {
        let kind = match previous.iter().find(|prev| prev.id == task.id) {
            Some(prev) => match (prev.status, task.status) {
                (before, TaskStatus::Completed) if before != TaskStatus::Completed => {
                    Some(TransitionKind::Completed)
                }
                (TaskStatus::InProgress, TaskStatus::Pending) => Some(TransitionKind::Reverted),
                _ => None,
            },
            // A task we have never seen that is already completed finished
            // between two reads.
            None if task.status == TaskStatus::Completed => Some(TransitionKind::Completed),
            None => None,
        };

        if let Some(kind) = kind {
            trace!(
                source_file,
                task_id = %task.id,
                kind = ?kind,
                "Detected status transition"
            );
            events.push(TransitionEvent {
                source_file: source_file.to_string(),
                task: task.clone(),
                kind,
            });
        }
    }

    events
}

/// Per-source-file memory of the last successfully parsed collection.
///
/// Entries are created on the first successful read of a file and replaced
/// unconditionally on every subsequent read, whether or not any event fired.
/// Entries are never removed; stale entries for deleted files persist
/// harmlessly for the lifetime of the monitoring session.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<String, Vec<Task>>,
}

impl SnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs `current` against the stored snapshot for `source_file`, then
    /// replaces the snapshot with `current`.
    ///
    /// Returns the transition events in the iteration order of `current`.
    /// Re-applying an unchanged collection yields no events, which makes the
    /// scan routine idempotent across overlapping triggers.
    pub fn apply(&mut self, source_file: &str, current: Vec<Task>) -> Vec<TransitionEvent> {
        let events = diff(source_file, self.snapshots.get(source_file).map(Vec::as_slice), &current);
        self.snapshots.insert(source_file.to_string(), current);
        events
    }

    /// Returns the last-seen collection for a source file, if any.
    #[must_use]
    pub fn get(&self, source_file: &str) -> Option<&[Task]> {
        self.snapshots.get(source_file).map(Vec::as_slice)
    }

    /// Returns true if any stored task is currently `in_progress`.
    ///
    /// Used by the observer's advisory liveness check.
    #[must_use]
    pub fn any_in_progress(&self) -> bool {
        self.snapshots
            .values()
            .flatten()
            .any(|task| task.status == TaskStatus::InProgress)
    }

    /// Number of source files with a stored snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if no file has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
