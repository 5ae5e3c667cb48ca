//! TaskPing Relay - main entry point.
//!
//! Starts the notification webhook service with:
//! - Structured JSON logging for production
//! - Graceful shutdown handling (SIGTERM/SIGINT)
//!
//! # Configuration
//!
//! See [`taskping_relay::config`] for environment variable configuration.
//!
//! # Example
//!
//! ```bash
//! PORT=3456 TASKPING_SETTINGS_PATH=/var/lib/taskping/settings.json \
//! cargo run --release --bin taskping-relay
//! ```

use std::process::ExitCode;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use taskping_relay::config::Config;
use taskping_relay::routes::{create_router, AppState};
use taskping_relay::settings::SettingsStore;
use taskping_relay::sms::SmsClient;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("Optional environment variables:");
            eprintln!("  PORT                     - HTTP server port (default: 3456)");
            eprintln!("  TASKPING_SETTINGS_PATH   - Settings file (default: ./settings.json)");
            eprintln!("  TASKPING_TEXTBELT_URL    - SMS provider URL (default: https://textbelt.com)");
            eprintln!("  RUST_LOG                 - Log level filter (default: info)");
            return ExitCode::from(1);
        }
    };

    info!(
        port = config.port,
        settings_path = %config.settings_path.display(),
        "TaskPing relay starting"
    );

    let state = AppState::new(
        SettingsStore::new(config.settings_path.clone()),
        SmsClient::new(config.textbelt_url.clone()),
    );
    let app = create_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => {
            info!(address = %bind_addr, "Relay listening");
            listener
        }
        Err(err) => {
            error!(error = %err, address = %bind_addr, "Failed to bind to address");
            return ExitCode::from(1);
        }
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!(error = %err, "Server error");
        return ExitCode::from(1);
    }

    info!("Relay shutdown complete");
    ExitCode::SUCCESS
}

/// Initializes structured JSON logging.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();
}

/// Resolves when a shutdown signal (SIGINT or SIGTERM) is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
