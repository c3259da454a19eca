//! Resource configuration.
//!
//! Provides [`ResourceConfig`] for configuring the StackSet custom resource.
//! Values are loaded from the Lambda environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::retry::RetryPolicy;

/// Custom resource configuration.
///
/// # Examples
///
/// ```
/// use stackset_core::config::ResourceConfig;
///
/// let config = ResourceConfig::default();
/// assert_eq!(config.retry_attempts, 20);
/// assert_eq!(config.retry_delay_secs, 15);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    /// Region of the CloudFormation client, i.e. where the StackSet lives.
    #[builder(default = String::from("us-east-1"))]
    pub region: String,

    /// Attempts per API call while another StackSet operation is running.
    #[builder(default = 20)]
    pub retry_attempts: u32,

    /// Seconds to wait between attempts.
    #[builder(default = 15)]
    pub retry_delay_secs: u64,

    /// Seconds before the Lambda deadline at which a FAILED response is sent.
    #[builder(default = 5)]
    pub timeout_margin_secs: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            region: String::from("us-east-1"),
            retry_attempts: 20,
            retry_delay_secs: 15,
            timeout_margin_secs: 5,
            log_level: String::from("info"),
        }
    }
}

impl ResourceConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AWS_REGION` | `us-east-1` |
    /// | `STACKSET_RETRY_ATTEMPTS` | `20` |
    /// | `STACKSET_RETRY_DELAY_SECS` | `15` |
    /// | `STACKSET_TIMEOUT_MARGIN_SECS` | `5` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparseable numbers fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("AWS_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("STACKSET_RETRY_ATTEMPTS") {
            if let Ok(n) = v.parse::<u32>() {
                config.retry_attempts = n.max(1);
            }
        }
        if let Ok(v) = std::env::var("STACKSET_RETRY_DELAY_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.retry_delay_secs = n;
            }
        }
        if let Ok(v) = std::env::var("STACKSET_TIMEOUT_MARGIN_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.timeout_margin_secs = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Retry policy for in-progress StackSet operations.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_secs(self.retry_delay_secs))
    }

    /// Time reserved before the Lambda deadline.
    #[must_use]
    pub fn timeout_margin(&self) -> Duration {
        Duration::from_secs(self.timeout_margin_secs)
    }
}
