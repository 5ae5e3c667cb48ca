//! Parsing of task-list files.
//!
//! A task-list file is a UTF-8 JSON array of task objects. Parsing is strict
//! at the top level (content that is not a JSON array is an error, so the
//! caller can skip the file and keep its previous snapshot) but lenient per
//! entry: a malformed entry is dropped with a debug log while the rest of
//! the collection survives. This guards against partially written files
//! without discarding an otherwise usable read.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::types::Task;

/// Errors that can occur when parsing a task-list file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file content is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The top-level JSON value is not an array.
    #[error("task file must be a JSON array")]
    NotAnArray,
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses a task-list file's content into a collection of tasks.
///
/// Invalid JSON and non-array content are errors; the caller treats them the
/// same way as an unreadable file and retains the previous snapshot. An
/// empty array is a valid empty collection. Entries that fail to parse
/// (missing fields, unknown status values) are skipped.
///
/// # Example
///
/// ```
/// use taskping_monitor::parser::parse_task_file;
///
/// let json = r#"[
///   {"id": "1", "content": "Fix bug", "status": "completed"},
///   {"id": "2", "content": "half-written entry"},
///   {"id": "3", "content": "Write docs", "status": "pending"}
/// ]"#;
///
/// let tasks = parse_task_file(json).unwrap();
/// assert_eq!(tasks.len(), 2);
/// ```
pub fn parse_task_file(content: &str) -> Result<Vec<Task>> {
    let value: Value = serde_json::from_str(content)?;

    let array = value.as_array().ok_or(ParseError::NotAnArray)?;

    Ok(array
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Task>(entry.clone()) {
            Ok(task) => Some(task),
            Err(e) => {
                debug!(error = %e, "Skipping malformed task entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    #[test]
    fn parses_a_valid_collection() {
        let json = r#"[
            {"id": "1", "content": "Fix bug", "status": "in_progress"},
            {"id": "2", "content": "Write docs", "status": "pending"}
        ]"#;

        let tasks = parse_task_file(json).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[0].status, TaskStatus::InProgress);
        assert_eq!(tasks[1].status, TaskStatus::Pending);
    }

    #[test]
    fn empty_array_is_an_empty_collection() {
        let tasks = parse_task_file("[]").unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_task_file("[{\"id\": "),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn non_array_content_is_an_error() {
        assert!(matches!(
            parse_task_file(r#"{"id": "1"}"#),
            Err(ParseError::NotAnArray)
        ));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let json = r#"[
            {"id": "1", "content": "Valid", "status": "completed"},
            {"id": "2", "content": "No status"},
            {"id": "3", "content": "Bad status", "status": "cancelled"},
            {"id": "4", "content": "Also valid", "status": "pending"}
        ]"#;

        let tasks = parse_task_file(json).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[1].id, "4");
    }

    #[test]
    fn preserves_file_order() {
        let json = r#"[
            {"id": "b", "content": "second", "status": "pending"},
            {"id": "a", "content": "first", "status": "pending"}
        ]"#;

        let tasks = parse_task_file(json).unwrap();
        assert_eq!(tasks[0].id, "b");
        assert_eq!(tasks[1].id, "a");
    }
}
