//! Custom resource responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::CustomResourceRequest;

/// Outcome reported back to CloudFormation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// The event was handled.
    Success,
    /// The event failed; `Reason` explains why.
    Failed,
}

/// The JSON document `PUT` to the request's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    /// Outcome.
    pub status: ResponseStatus,
    /// Failure reason, or a pointer to the logs on success.
    pub reason: String,
    /// Physical id of the resource.
    pub physical_resource_id: String,
    /// Echoed from the request.
    pub stack_id: String,
    /// Echoed from the request.
    pub request_id: String,
    /// Echoed from the request.
    pub logical_resource_id: String,
    /// Whether `Data` must be masked in the console.
    pub no_echo: bool,
    /// Attributes exposed through `Fn::GetAtt`.
    pub data: Map<String, Value>,
}

impl CustomResourceResponse {
    /// A successful response for `request`.
    #[must_use]
    pub fn success(
        request: &CustomResourceRequest,
        physical_resource_id: impl Into<String>,
        data: Map<String, Value>,
        reason: impl Into<String>,
    ) -> Self {
        Self::build(
            request,
            ResponseStatus::Success,
            physical_resource_id.into(),
            reason.into(),
            data,
        )
    }

    /// A failed response for `request`.
    #[must_use]
    pub fn failed(
        request: &CustomResourceRequest,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::build(
            request,
            ResponseStatus::Failed,
            physical_resource_id.into(),
            reason.into(),
            Map::new(),
        )
    }

    fn build(
        request: &CustomResourceRequest,
        status: ResponseStatus,
        physical_resource_id: String,
        reason: String,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            status,
            reason,
            physical_resource_id,
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}
