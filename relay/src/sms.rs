//! TextBelt SMS transport.
//!
//! Thin client around the TextBelt HTTP API. Transport failures are folded
//! into a structured `{success: false, error}` result rather than bubbling
//! up, because a failed SMS is a normal negative outcome for the caller,
//! never a reason to fail the request that triggered it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Production TextBelt endpoint.
pub const DEFAULT_TEXTBELT_URL: &str = "https://textbelt.com";

/// Request body for the TextBelt send endpoint.
#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    phone: &'a str,
    message: &'a str,
    key: &'a str,
}

/// Outcome of an SMS send attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsResult {
    /// Whether the provider accepted the message.
    pub success: bool,

    /// Remaining quota on the API key, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_remaining: Option<u64>,

    /// Provider-assigned message identifier, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<u64>,

    /// Error description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SmsResult {
    /// Builds a failed result from an error description.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            quota_remaining: None,
            text_id: None,
            error: Some(error.into()),
        }
    }
}

/// HTTP client for the TextBelt API.
#[derive(Debug, Clone)]
pub struct SmsClient {
    client: Client,
    base_url: String,
}

impl SmsClient {
    /// Creates a client against a specific base URL (overridable for tests).
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client against the production TextBelt endpoint.
    #[must_use]
    pub fn textbelt() -> Self {
        Self::new(DEFAULT_TEXTBELT_URL.to_string())
    }

    /// Sends one SMS.
    ///
    /// Never returns an error: an unreachable provider or an unparsable
    /// response becomes a `success: false` result.
    pub async fn send(&self, phone: &str, message: &str, key: &str) -> SmsResult {
        let request = SmsRequest {
            phone,
            message,
            key,
        };

        let response = self
            .client
            .post(format!("{}/text", self.base_url))
            .json(&request)
            .send()
            .await;

        match response {
            Ok(response) => match response.json::<SmsResult>().await {
                Ok(result) => {
                    debug!(
                        success = result.success,
                        quota_remaining = result.quota_remaining,
                        "SMS provider responded"
                    );
                    result
                }
                Err(e) => {
                    warn!(error = %e, "SMS provider returned an unparsable response");
                    SmsResult::failure(format!("invalid provider response: {e}"))
                }
            },
            Err(e) => {
                warn!(error = %e, "SMS send failed");
                SmsResult::failure(e.to_string())
            }
        }
    }
}
