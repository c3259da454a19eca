//! Delivery of custom resource responses to the pre-signed `ResponseURL`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use stackset_model::CustomResourceResponse;
use tracing::{info, warn};

/// Sends responses with a bounded exponential backoff.
#[derive(Debug, Clone)]
pub struct Responder {
    client: reqwest::Client,
    max_attempts: u32,
    base_delay: Duration,
}

impl Responder {
    /// Delivery attempts before giving up.
    pub const MAX_ATTEMPTS: u32 = 5;
    /// Delay before the second attempt; doubled for every further one.
    pub const BASE_DELAY: Duration = Duration::from_secs(1);
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build a responder with its own HTTP client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            max_attempts: Self::MAX_ATTEMPTS,
            base_delay: Self::BASE_DELAY,
        })
    }

    /// `PUT` `response` to `url`.
    ///
    /// The pre-signed URL is signed without a content type, so the header is
    /// sent empty.
    pub async fn send(&self, url: &str, response: &CustomResourceResponse) -> Result<()> {
        let body = serde_json::to_vec(response).context("failed to encode response")?;
        info!(
            status = ?response.status,
            physical_resource_id = %response.physical_resource_id,
            "sending response"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.put(url, body.clone()).await {
                Ok(status) => {
                    info!(status, attempt, "response delivered");
                    return Ok(());
                }
                Err(e) if attempt < self.max_attempts => {
                    let delay = backoff(self.base_delay, attempt);
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "response delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("failed to deliver response after {attempt} attempts")
                    });
                }
            }
        }
    }

    async fn put(&self, url: &str, body: Vec<u8>) -> Result<u16> {
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.status().as_u16())
    }
}

/// Delay after failed attempt `attempt` (1-based).
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1 << attempt.saturating_sub(1).min(16))
}
