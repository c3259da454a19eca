//! Operation preference coercion.
//!
//! Template values arrive as strings; the API wants integers for the
//! concurrency and tolerance knobs.

use serde_json::{Map, Value};
use stackset_model::kv::scalar_to_string;
use tracing::{debug, info, warn};

use crate::error::{StackSetError, StackSetResult};

/// Throttling and ordering controls for StackSet operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationPreferences {
    /// Failures tolerated per region before the operation stops.
    pub failure_tolerance_count: Option<i32>,
    /// Same as `failure_tolerance_count`, as a percentage of accounts.
    pub failure_tolerance_percentage: Option<i32>,
    /// Accounts processed concurrently.
    pub max_concurrent_count: Option<i32>,
    /// Same as `max_concurrent_count`, as a percentage of accounts.
    pub max_concurrent_percentage: Option<i32>,
    /// Order in which regions are processed.
    pub region_order: Option<Vec<String>>,
    /// `SEQUENTIAL` or `PARALLEL`.
    pub region_concurrency_type: Option<String>,
}

impl OperationPreferences {
    /// Coerce the raw `OperationPreferences` object.
    ///
    /// Unknown keys are logged and skipped.
    pub fn from_properties(raw: &Map<String, Value>) -> StackSetResult<Self> {
        info!("converting operation preferences");
        let mut prefs = Self::default();

        for (key, value) in raw {
            debug!(key = %key, value = %value, "evaluating operation preference");
            match key.as_str() {
                "FailureToleranceCount" => {
                    prefs.failure_tolerance_count = Some(parse_int(key, value)?);
                }
                "FailureTolerancePercentage" => {
                    prefs.failure_tolerance_percentage = Some(parse_int(key, value)?);
                }
                "MaxConcurrentCount" => prefs.max_concurrent_count = Some(parse_int(key, value)?),
                "MaxConcurrentPercentage" => {
                    prefs.max_concurrent_percentage = Some(parse_int(key, value)?);
                }
                "RegionOrder" => prefs.region_order = Some(parse_list(key, value)?),
                "RegionConcurrencyType" => {
                    prefs.region_concurrency_type = Some(parse_string(key, value)?);
                }
                _ => warn!(key = %key, "skipping unknown key in operation preferences"),
            }
        }

        Ok(prefs)
    }

    /// Coerce optional preferences; absent means defaults.
    pub fn from_optional(raw: Option<&Map<String, Value>>) -> StackSetResult<Self> {
        raw.map_or_else(|| Ok(Self::default()), Self::from_properties)
    }

    /// Whether no preference is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn invalid(key: &str, value: &Value) -> StackSetError {
    StackSetError::InvalidOperationPreference {
        key: key.to_owned(),
        value: value.to_string(),
    }
}

fn parse_string(key: &str, value: &Value) -> StackSetResult<String> {
    scalar_to_string(value.clone()).ok_or_else(|| invalid(key, value))
}

fn parse_int(key: &str, value: &Value) -> StackSetResult<i32> {
    parse_string(key, value)?
        .trim()
        .parse()
        .map_err(|_| invalid(key, value))
}

/// Accept either a JSON list or a comma-separated string.
fn parse_list(key: &str, value: &Value) -> StackSetResult<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| parse_string(key, item))
            .collect(),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()),
        _ => Err(invalid(key, value)),
    }
}
