//! Core data model for the TaskPing monitor.
//!
//! Task-list files are JSON arrays of task objects written by an external
//! agent process:
//!
//! ```json
//! [
//!   {"id": "1", "content": "Fix the login bug", "status": "in_progress"},
//!   {"id": "2", "content": "Write release notes", "status": "pending"}
//! ]
//! ```
//!
//! The monitor tracks each task by its `id` and watches for status
//! transitions. Two transition patterns are recognized:
//!
//! - **Completed**: any status → `completed` (including a task that first
//!   appears already completed, which models work that started and finished
//!   between two reads)
//! - **Reverted**: `in_progress` → `pending`, which usually indicates the
//!   agent backed out of a task

use serde::{Deserialize, Serialize};

/// Status of a task as written by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task waiting to start.
    Pending,
    /// Task currently being worked on.
    InProgress,
    /// Task finished.
    Completed,
}

impl TaskStatus {
    /// Attempts to parse a status from its wire representation.
    ///
    /// # Example
    ///
    /// ```
    /// use taskping_monitor::types::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::parse("completed"), Some(TaskStatus::Completed));
    /// assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
    /// assert_eq!(TaskStatus::parse("done"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// A single task from a task-list file.
///
/// Identity is the `id` field, unique within its collection. `status` is the
/// only field whose changes are tracked. Extra JSON fields written by the
/// agent are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within the collection.
    pub id: String,

    /// Human-readable task description.
    pub content: String,

    /// Current status.
    pub status: TaskStatus,
}

/// The kind of status transition detected by the diff engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// The task moved into the terminal `completed` state.
    Completed,
    /// The task moved from `in_progress` back to `pending`.
    Reverted,
}

/// A detected status transition for a single task.
///
/// Derived from two consecutive reads of the same source file and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Identifier of the source file the task was read from.
    pub source_file: String,

    /// The task in its current (post-transition) state.
    pub task: Task,

    /// Which transition pattern was matched.
    pub kind: TransitionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let json = r#""in_progress""#;
        let status: TaskStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        assert_eq!(serde_json::to_string(&status).unwrap(), json);
    }

    #[test]
    fn task_deserializes_ignoring_extra_fields() {
        let json = r#"{"id": "7", "content": "Ship it", "status": "completed", "activeForm": "Shipping"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "7");
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!(TaskStatus::parse("cancelled"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }
}
