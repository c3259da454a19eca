//! Custom resource request events.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::properties::ResourceProperties;

/// Physical id reported when a create fails before a StackSet exists.
///
/// A delete carrying this id is the rollback of that failed create.
pub const NO_PHYSICAL_ID: &str = "NONE";

/// Lifecycle event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Resource creation.
    Create,
    /// Property change.
    Update,
    /// Resource removal.
    Delete,
}

impl RequestType {
    /// Returns the event type string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CloudFormation custom resource request.
///
/// Properties are kept as raw JSON objects so that change detection can
/// compare exactly what the template declared; use
/// [`CustomResourceRequest::properties`] for the typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequest {
    /// Event type.
    pub request_type: RequestType,
    /// Pre-signed S3 URL the response must be `PUT` to.
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    /// ARN of the parent stack.
    pub stack_id: String,
    /// Unique id of this request.
    pub request_id: String,
    /// Template resource type, e.g. `Custom::StackSet`.
    #[serde(default)]
    pub resource_type: String,
    /// Logical id of the resource in the parent template.
    pub logical_resource_id: String,
    /// Physical id, present on update and delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// ARN of the function serving this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    /// Current properties.
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    /// Previous properties, present on update.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub old_resource_properties: Map<String, Value>,
}

impl CustomResourceRequest {
    /// Typed view of the current properties.
    pub fn properties(&self) -> Result<ResourceProperties, serde_json::Error> {
        ResourceProperties::from_map(&self.resource_properties)
    }

    /// Typed view of the previous properties.
    pub fn old_properties(&self) -> Result<ResourceProperties, serde_json::Error> {
        ResourceProperties::from_map(&self.old_resource_properties)
    }
}
