//! Key/value list expansion.

use stackset_model::KeyValue;
use tracing::debug;

use crate::api::{Parameter, Tag};

/// Expand `[{"Key": "Value"}]` into `{ParameterKey, ParameterValue}` records.
#[must_use]
pub fn expand_parameters(params: &[KeyValue]) -> Vec<Parameter> {
    params
        .iter()
        .map(|kv| {
            debug!(key = %kv.key, value = %kv.value, "expanding parameter");
            Parameter {
                key: kv.key.clone(),
                value: kv.value.clone(),
            }
        })
        .collect()
}

/// Expand `[{"Key": "Value"}]` into `{Key, Value}` tags.
#[must_use]
pub fn expand_tags(tags: &[KeyValue]) -> Vec<Tag> {
    tags.iter()
        .map(|kv| Tag {
            key: kv.key.clone(),
            value: kv.value.clone(),
        })
        .collect()
}
