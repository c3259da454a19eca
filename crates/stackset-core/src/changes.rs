//! Property change detection.

use serde_json::{Map, Value};
use tracing::debug;

/// Properties whose change requires an `UpdateStackSet` call.
pub const STACK_SET_ATTRIBUTES: &[&str] = &[
    "TemplateURL",
    "Parameters",
    "Tags",
    "Capabilities",
    "StackSetDescription",
    "AdministrationRoleARN",
    "ExecutionRoleName",
];

/// Whether any of `attributes` was added, removed, or changed between `old`
/// and `new`.
///
/// Values are compared as JSON, so `"1"` and `1` differ.
#[must_use]
pub fn change_requires_update(
    attributes: &[&str],
    old: &Map<String, Value>,
    new: &Map<String, Value>,
) -> bool {
    attributes.iter().any(|attribute| {
        match (old.get(*attribute), new.get(*attribute)) {
            (None, Some(value)) => {
                debug!(attribute, %value, "new value");
                true
            }
            (Some(value), None) => {
                debug!(attribute, %value, "value removed");
                true
            }
            (Some(before), Some(after)) => {
                debug!(attribute, %before, %after, "evaluating");
                before != after
            }
            (None, None) => false,
        }
    })
}
