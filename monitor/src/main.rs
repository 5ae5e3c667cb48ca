//! TaskPing Monitor - main entry point.
//!
//! Watches a directory of task-list files and forwards completion events to
//! the TaskPing relay, which turns them into SMS notifications.
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options; CLI flags
//! take precedence over the environment.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use taskping_monitor::config::Config;
use taskping_monitor::diff::SnapshotStore;
use taskping_monitor::notifier::Notifier;
use taskping_monitor::observer::{DirectoryObserver, ObserverConfig};

/// Capacity of the completion event channel.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// TaskPing Monitor - task list completion watcher.
///
/// Observes a directory of task-list files and sends an SMS through the
/// TaskPing relay whenever a task transitions to completed.
#[derive(Parser, Debug)]
#[command(name = "taskping-monitor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TASKPING_TASKS_DIR          Task directory (default: ~/.claude/todos)
    TASKPING_RELAY_URL          Relay base URL (default: http://localhost:3456)
    TASKPING_POLL_INTERVAL_MS   Polling interval in ms (default: 2000)

EXAMPLES:
    # Watch the default directory
    taskping-monitor

    # Watch a custom directory with a faster poll
    taskping-monitor --tasks-dir /tmp/tasks --poll-interval-ms 500
")]
struct Cli {
    /// Directory of task-list files to observe.
    #[arg(long)]
    tasks_dir: Option<PathBuf>,

    /// Base URL of the relay service.
    #[arg(long)]
    relay_url: Option<String>,

    /// Polling backstop interval in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run_monitor(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Monitor failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Runs the monitor until a shutdown signal arrives.
async fn run_monitor(cli: Cli) -> Result<()> {
    info!("Starting TaskPing Monitor");

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.tasks_dir {
        config.tasks_dir = dir;
    }
    if let Some(url) = cli.relay_url {
        config.relay_url = url;
    }
    if let Some(ms) = cli.poll_interval_ms {
        config.poll_interval_ms = ms;
    }

    info!(
        tasks_dir = %config.tasks_dir.display(),
        relay_url = %config.relay_url,
        poll_interval_ms = config.poll_interval_ms,
        "Configuration loaded"
    );

    // Missing task directory is fatal: there is nothing to observe.
    if !config.tasks_dir.is_dir() {
        anyhow::bail!(
            "task directory not found: {} (run the agent at least once to create it)",
            config.tasks_dir.display()
        );
    }

    let notifier = Notifier::new(config.relay_url.clone());
    if !notifier.check_service().await {
        warn!(
            relay_url = %config.relay_url,
            "Relay service is not responding; continuing anyway"
        );
    }

    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let observer_config = ObserverConfig {
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        ..ObserverConfig::default()
    };
    let observer = DirectoryObserver::new(
        config.tasks_dir.clone(),
        SnapshotStore::new(),
        event_tx,
        observer_config,
    )
    .context("Failed to initialize directory observer")?;

    info!(
        tasks_dir = %observer.tasks_dir().display(),
        "Monitor running. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = wait_for_shutdown() => {
                info!("Shutdown signal received");
                break;
            }

            Some(event) = event_rx.recv() => {
                // Fire-and-forget: delivery failures are logged by the
                // notifier task and never stall the scan loop.
                notifier.spawn_notify(event);
            }
        }
    }

    // Dropping the observer releases the watch handle and stops the
    // polling and scan tasks.
    drop(observer);
    info!("Monitor stopped");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
