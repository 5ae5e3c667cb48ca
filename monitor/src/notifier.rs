//! Delivery shim client.
//!
//! Forwards `Completed` transition events to the TaskPing relay, which
//! condenses the text and performs the actual SMS call. Deliveries are
//! fire-and-forget relative to the scan loop: a slow or failed call stalls
//! only its own detached task, never the observer. There are no retries; a
//! missed notification is re-derived from the next genuine transition, not
//! replayed.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::TransitionEvent;

/// Errors that can occur during a delivery attempt.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Request body sent to the relay's task-complete endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyRequest {
    /// The task description.
    pub task: String,
    /// Free-form response text to condense into the SMS body.
    pub response: String,
    /// Whether the task finished successfully.
    pub success: bool,
}

/// Response body returned by the relay.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    /// Whether the SMS was sent.
    pub success: bool,
    /// The message as actually sent, after condensation.
    #[serde(default)]
    pub sent_message: Option<String>,
    /// Remaining SMS quota reported by the provider.
    #[serde(default)]
    pub quota_remaining: Option<u64>,
    /// Error description when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}

/// HTTP client for the TaskPing relay.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    relay_url: String,
}

impl Notifier {
    /// Creates a notifier pointed at the relay base URL.
    #[must_use]
    pub fn new(relay_url: String) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sends one completion notification and returns the relay's verdict.
    ///
    /// A `success: false` response is a normal negative result (notifications
    /// disabled, no phone number, provider out of quota), not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the relay is unreachable or responds with
    /// a non-JSON body.
    pub async fn notify(&self, event: &TransitionEvent) -> Result<NotifyResponse, NotifierError> {
        let request = NotifyRequest {
            task: event.task.content.clone(),
            response: format!("Task completed: {}", event.task.content),
            success: true,
        };

        let response = self
            .client
            .post(format!("{}/api/task-complete", self.relay_url))
            .json(&request)
            .send()
            .await?
            .json::<NotifyResponse>()
            .await?;

        Ok(response)
    }

    /// Delivers an event on a detached task.
    ///
    /// Failures are captured into the log sink and never propagated; the
    /// caller goes straight back to scanning.
    pub fn spawn_notify(&self, event: TransitionEvent) {
        let notifier = self.clone();
        tokio::spawn(async move {
            match notifier.notify(&event).await {
                Ok(response) if response.success => {
                    info!(
                        task = %event.task.content,
                        sent_message = response.sent_message.as_deref().unwrap_or(""),
                        quota_remaining = response.quota_remaining,
                        "SMS sent"
                    );
                }
                Ok(response) => {
                    warn!(
                        task = %event.task.content,
                        error = response.error.as_deref().unwrap_or("unknown"),
                        "SMS not sent"
                    );
                }
                Err(e) => {
                    warn!(task = %event.task.content, error = %e, "Failed to reach relay");
                }
            }
        });
    }

    /// Probes the relay's liveness endpoint.
    ///
    /// Used once at startup; an unreachable relay is a warning, not a fatal
    /// error, since the relay may come up later.
    pub async fn check_service(&self) -> bool {
        let url = format!("{}/api/test", self.relay_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, "Relay is reachable");
                true
            }
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Relay returned an error status");
                false
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Relay is unreachable");
                false
            }
        }
    }
}
