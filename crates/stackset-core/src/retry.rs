//! Bounded retry for in-progress StackSet operations.
//!
//! CloudFormation serializes operations per StackSet and rejects a call with
//! `OperationInProgressException` while another one runs. The only remedy is
//! to wait and try again; every other error is returned immediately.

use std::future::Future;
use std::time::Duration;

use stackset_model::ApiError;
use tracing::warn;

/// Attempt budget and fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_ATTEMPTS: u32 = 20;
    /// Default delay between attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(15);

    /// Create a policy. At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that does not sleep between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Maximum number of calls.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between calls.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Why a retried call gave up.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// Every attempt hit an in-progress operation.
    #[error("operation still in progress after {attempts} attempts")]
    Exhausted {
        /// Number of calls made.
        attempts: u32,
    },
    /// A non-retryable API error.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent.
///
/// Exactly `min(n, max_attempts)` calls are made, where `n` is the first
/// attempt that does not hit an in-progress operation. There is no sleep
/// after the final attempt.
pub async fn retry_in_progress<T, F, Fut>(
    policy: &RetryPolicy,
    stack_set: &str,
    mut call: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_in_progress() => {
                if attempt >= policy.max_attempts {
                    return Err(RetryError::Exhausted { attempts: attempt });
                }
                warn!(
                    stack_set,
                    attempt,
                    delay_secs = policy.delay.as_secs(),
                    "operation in progress, sleeping before retry"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(RetryError::Api(e)),
        }
    }
}
