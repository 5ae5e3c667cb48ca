//! HTTP route handlers for the TaskPing relay.
//!
//! This module provides the HTTP API endpoints:
//!
//! - `GET /api/settings` - Read the persisted notification settings
//! - `POST /api/settings` - Merge-patch the settings
//! - `POST /api/notify` - Send a raw message as an SMS
//! - `POST /api/task-complete` - Compose and send a task notification
//! - `GET /api/test` - Liveness probe
//!
//! Disabled notifications and missing destination numbers return HTTP 200
//! with `{success: false, error}`: they are normal negative results, not
//! error paths.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::condense::{compose_sms, condense, SMS_MAX_LEN};
use crate::error::RelayError;
use crate::settings::{Settings, SettingsStore};
use crate::sms::{SmsClient, SmsResult};

/// Shared application state for all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// File-backed settings store, reloaded per request.
    pub settings: SettingsStore,

    /// SMS transport client.
    pub sms: SmsClient,
}

impl AppState {
    /// Creates application state from its components.
    #[must_use]
    pub fn new(settings: SettingsStore, sms: SmsClient) -> Self {
        Self { settings, sms }
    }
}

/// Creates the application router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/settings", get(get_settings).post(post_settings))
        .route("/api/notify", post(post_notify))
        .route("/api/task-complete", post(post_task_complete))
        .route("/api/test", get(get_test))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Settings
// ============================================================================

/// GET /api/settings - returns the persisted settings record.
async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, RelayError> {
    let settings = state.settings.load().await?;
    Ok(Json(settings))
}

/// POST /api/settings - merges the request body into the stored settings.
///
/// Unknown keys are ignored; omitted keys keep their current values.
async fn post_settings(
    State(state): State<AppState>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, RelayError> {
    let current = state.settings.load().await?;

    // Merge at the JSON level so partial updates work.
    let mut merged = serde_json::to_value(&current).map_err(crate::settings::SettingsError::from)?;
    if let (Some(target), Some(source)) = (merged.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }

    let settings: Settings =
        serde_json::from_value(merged).map_err(crate::settings::SettingsError::from)?;
    state.settings.save(&settings).await?;

    info!(enabled = settings.enabled, "Settings updated");
    Ok(Json(json!({ "success": true, "settings": settings })))
}

// ============================================================================
// Notification endpoints
// ============================================================================

/// Request body for the raw notify endpoint.
#[derive(Debug, Deserialize)]
struct NotifyBody {
    /// Message text; a default is substituted when absent.
    message: Option<String>,
}

/// Request body for the task-complete endpoint.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct TaskCompleteBody {
    /// The task description.
    task: String,

    /// Free-form response text to condense.
    response: String,

    /// Whether the task finished successfully.
    success: bool,
}

impl Default for TaskCompleteBody {
    fn default() -> Self {
        Self {
            task: String::new(),
            response: String::new(),
            success: true,
        }
    }
}

/// Response body for the notification endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryResponse {
    success: bool,

    /// The message as actually sent, after condensation.
    #[serde(skip_serializing_if = "Option::is_none")]
    sent_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    quota_remaining: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DeliveryResponse {
    /// Builds a negative result for a configuration-absence case.
    fn not_configured(error: &str) -> Self {
        Self {
            success: false,
            sent_message: None,
            quota_remaining: None,
            error: Some(error.to_string()),
        }
    }

    /// Wraps a provider result, echoing the message that went out.
    fn from_sms(result: SmsResult, sent_message: String) -> Self {
        Self {
            success: result.success,
            sent_message: Some(sent_message),
            quota_remaining: result.quota_remaining,
            error: result.error,
        }
    }
}

/// Checks the enabled flag and destination number.
///
/// Returns the settings when delivery can proceed, or the structured
/// negative result to return as-is.
fn check_deliverable(settings: Settings) -> Result<Settings, DeliveryResponse> {
    if !settings.enabled {
        debug!("Notifications are disabled");
        return Err(DeliveryResponse::not_configured("Notifications disabled"));
    }
    if settings.phone_number.is_empty() {
        debug!("No phone number configured");
        return Err(DeliveryResponse::not_configured(
            "No phone number configured",
        ));
    }
    Ok(settings)
}

/// POST /api/notify - sends a raw message, condensed to the SMS budget.
async fn post_notify(
    State(state): State<AppState>,
    Json(body): Json<NotifyBody>,
) -> Result<Json<DeliveryResponse>, RelayError> {
    let settings = match check_deliverable(state.settings.load().await?) {
        Ok(settings) => settings,
        Err(response) => return Ok(Json(response)),
    };

    let message = condense(
        body.message.as_deref().unwrap_or("Task completed!"),
        SMS_MAX_LEN,
    );

    let result = state
        .sms
        .send(&settings.phone_number, &message, &settings.api_key)
        .await;

    Ok(Json(DeliveryResponse::from_sms(result, message)))
}

/// POST /api/task-complete - composes the task notification and sends it.
///
/// The composed message is condensed once more at the full budget as a
/// safety net, since the label and task prefix can push the total over 160.
async fn post_task_complete(
    State(state): State<AppState>,
    Json(body): Json<TaskCompleteBody>,
) -> Result<Json<DeliveryResponse>, RelayError> {
    let settings = match check_deliverable(state.settings.load().await?) {
        Ok(settings) => settings,
        Err(response) => return Ok(Json(response)),
    };

    let message = compose_sms(&body.task, &body.response, body.success);

    info!(
        task = %body.task,
        message_len = message.chars().count(),
        "Sending task notification"
    );

    let result = state
        .sms
        .send(&settings.phone_number, &message, &settings.api_key)
        .await;

    Ok(Json(DeliveryResponse::from_sms(result, message)))
}

// ============================================================================
// Liveness
// ============================================================================

/// GET /api/test - liveness probe.
async fn get_test() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "TaskPing relay is running"
    }))
}
