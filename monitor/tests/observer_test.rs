//! Integration tests for the directory observer.
//!
//! These tests drive the observer against a temporary directory with a fast
//! polling interval so they do not depend on platform watcher behavior.

use std::fs;
use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use taskping_monitor::diff::SnapshotStore;
use taskping_monitor::observer::{DirectoryObserver, ObserverConfig};
use taskping_monitor::types::{TransitionEvent, TransitionKind};

/// Observer config with a fast poll so tests settle quickly.
fn fast_config() -> ObserverConfig {
    ObserverConfig {
        poll_interval: Duration::from_millis(50),
        notify_delay: Duration::from_millis(20),
        ..ObserverConfig::default()
    }
}

/// Writes a task-list file atomically enough for the test.
fn write_tasks(dir: &Path, name: &str, json: &str) {
    fs::write(dir.join(name), json).unwrap();
}

/// Receives one event or panics after the timeout.
async fn recv_event(rx: &mut mpsc::Receiver<TransitionEvent>) -> TransitionEvent {
    timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Asserts that no further event arrives within a few poll cycles.
async fn assert_no_event(rx: &mut mpsc::Receiver<TransitionEvent>) {
    let extra = timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(extra.is_err(), "unexpected extra event: {:?}", extra.unwrap());
}

#[tokio::test]
async fn completion_across_rewrites_emits_exactly_one_event() {
    let dir = tempfile::tempdir().unwrap();
    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "fix bug", "status": "in_progress"}]"#,
    );

    let (tx, mut rx) = mpsc::channel(16);
    let _observer = DirectoryObserver::new(
        dir.path().to_path_buf(),
        SnapshotStore::new(),
        tx,
        fast_config(),
    )
    .unwrap();

    // Let the first scan seed the snapshot; in_progress emits nothing.
    tokio::time::sleep(Duration::from_millis(250)).await;

    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "fix bug", "status": "completed"}]"#,
    );

    let event = recv_event(&mut rx).await;
    assert_eq!(event.kind, TransitionKind::Completed);
    assert_eq!(event.task.id, "1");
    assert_eq!(event.source_file, "a.json");

    // Subsequent polls re-read the same content and must stay silent.
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn task_already_completed_on_first_read_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "done already", "status": "completed"}]"#,
    );

    let (tx, mut rx) = mpsc::channel(16);
    let _observer = DirectoryObserver::new(
        dir.path().to_path_buf(),
        SnapshotStore::new(),
        tx,
        fast_config(),
    )
    .unwrap();

    let event = recv_event(&mut rx).await;
    assert_eq!(event.kind, TransitionKind::Completed);
    assert_eq!(event.task.content, "done already");

    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn reverted_tasks_are_never_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "flaky", "status": "in_progress"}]"#,
    );

    let (tx, mut rx) = mpsc::channel(16);
    let _observer = DirectoryObserver::new(
        dir.path().to_path_buf(),
        SnapshotStore::new(),
        tx,
        fast_config(),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(250)).await;

    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "flaky", "status": "pending"}]"#,
    );

    // The reversion is logged only; the channel stays empty.
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn malformed_rewrite_keeps_the_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "fix bug", "status": "in_progress"}]"#,
    );

    let (tx, mut rx) = mpsc::channel(16);
    let _observer = DirectoryObserver::new(
        dir.path().to_path_buf(),
        SnapshotStore::new(),
        tx,
        fast_config(),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(250)).await;

    // A partial write lands on disk. The scan must skip it without
    // disturbing the stored in_progress snapshot.
    write_tasks(dir.path(), "a.json", r#"[{"id": "1", "cont"#);
    tokio::time::sleep(Duration::from_millis(250)).await;

    // The completed write then diffs against the retained snapshot.
    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "fix bug", "status": "completed"}]"#,
    );

    let event = recv_event(&mut rx).await;
    assert_eq!(event.kind, TransitionKind::Completed);
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn non_json_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write_tasks(
        dir.path(),
        "notes.txt",
        r#"[{"id": "1", "content": "not a task file", "status": "completed"}]"#,
    );

    let (tx, mut rx) = mpsc::channel(16);
    let _observer = DirectoryObserver::new(
        dir.path().to_path_buf(),
        SnapshotStore::new(),
        tx,
        fast_config(),
    )
    .unwrap();

    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn files_are_tracked_independently() {
    let dir = tempfile::tempdir().unwrap();
    write_tasks(
        dir.path(),
        "a.json",
        r#"[{"id": "1", "content": "task a", "status": "in_progress"}]"#,
    );
    write_tasks(
        dir.path(),
        "b.json",
        r#"[{"id": "1", "content": "task b", "status": "in_progress"}]"#,
    );

    let (tx, mut rx) = mpsc::channel(16);
    let _observer = DirectoryObserver::new(
        dir.path().to_path_buf(),
        SnapshotStore::new(),
        tx,
        fast_config(),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(250)).await;

    write_tasks(
        dir.path(),
        "b.json",
        r#"[{"id": "1", "content": "task b", "status": "completed"}]"#,
    );

    let event = recv_event(&mut rx).await;
    assert_eq!(event.source_file, "b.json");
    assert_eq!(event.task.content, "task b");
    assert_no_event(&mut rx).await;
}
