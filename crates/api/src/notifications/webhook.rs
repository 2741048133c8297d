//! Merchant webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDispatcher`] posts a [`WebhookPayload`] to the merchant's webhook
//! URL. Failed attempts are retried three times with backoff (1 s, 2 s, 4 s).
//! Deliveries run on tracked background tasks so shutdown can wait for them.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use portal_core::webhook::{sign_payload, WebhookPayload, SIGNATURE_HEADER};
use tokio_util::task::TaskTracker;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// WebhookDispatcher
// ---------------------------------------------------------------------------

/// Delivers order status notifications to merchant webhooks.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    signing_secret: Option<String>,
    tasks: TaskTracker,
}

impl WebhookDispatcher {
    /// Create a dispatcher. Payloads are signed when `signing_secret` is set.
    pub fn new(signing_secret: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            signing_secret,
            tasks: TaskTracker::new(),
        }
    }

    /// Deliver `payload` in the background. Errors are logged, not returned.
    pub fn dispatch(&self, url: String, payload: WebhookPayload) {
        let client = self.client.clone();
        let secret = self.signing_secret.clone();
        self.tasks.spawn(async move {
            let delivery = Delivery { client, secret };
            if let Err(e) = delivery.deliver(&url, &payload).await {
                tracing::error!(url = %url, crn = %payload.crn, error = %e, "Webhook delivery abandoned");
            }
        });
    }

    /// Stop accepting deliveries and wait up to `timeout` for in-flight ones.
    pub async fn shutdown(&self, timeout: Duration) {
        self.tasks.close();
        if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
            tracing::warn!(
                pending = self.tasks.len(),
                "Timed out waiting for webhook deliveries"
            );
        }
    }

    /// Number of deliveries still running.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

struct Delivery {
    client: reqwest::Client,
    secret: Option<String>,
}

impl Delivery {
    async fn deliver(&self, url: &str, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let body = serde_json::to_vec(payload)?;
        let signature = self
            .secret
            .as_deref()
            .map(|secret| sign_payload(secret, &body));

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, &body, signature.as_deref()).await {
                Ok(()) => {
                    tracing::info!(url, crn = %payload.crn, status = %payload.status, "Webhook delivered");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(url, &body, signature.as_deref()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url, error = %e, "Webhook delivery failed after all retries");
                Err(e)
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(
        &self,
        url: &str,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<(), WebhookError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let _dispatcher = WebhookDispatcher::new(None);
    }

    #[test]
    fn webhook_error_display_http_status() {
        let err = WebhookError::HttpStatus(502);
        assert_eq!(err.to_string(), "Webhook returned HTTP 502");
    }

    #[test]
    fn webhook_error_display_request() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = WebhookError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }

    #[tokio::test]
    async fn shutdown_with_no_deliveries_returns_immediately() {
        let dispatcher = WebhookDispatcher::new(Some("secret".into()));
        dispatcher.shutdown(Duration::from_millis(50)).await;
        assert_eq!(dispatcher.pending(), 0);
    }
}
