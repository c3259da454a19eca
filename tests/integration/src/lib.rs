//! Integration tests for the StackSet custom resource.
//!
//! Most tests drive [`StackSetResource`] end to end against the recording
//! fake from `stackset_core::testing`, with no delay between retries. Tests
//! marked `#[ignore]` talk to real CloudFormation and need AWS credentials
//! plus `STACKSET_TEST_TEMPLATE_URL` and `STACKSET_TEST_ACCOUNT`.
//!
//! Run them with:
//! ```text
//! cargo test -p stackset-integration -- --ignored
//! ```

use std::sync::Once;

use serde_json::{Value, json};
use stackset_core::testing::RecordingStackSetApi;
use stackset_core::{RetryPolicy, StackSetResource};
use stackset_model::CustomResourceRequest;

static INIT: Once = Once::new();

/// Stack ARN of the parent stack used by every event.
pub const STACK_ID: &str =
    "arn:aws:cloudformation:us-east-1:123456789012:stack/platform/5e2f6a70-0000-11ef-9a2b-0a1b2c3d4e5f";

/// Id the fake assigns to the StackSet created for [`STACK_ID`].
pub const STACK_SET_ID: &str = "platform-Baseline:0001";

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A resource over a fresh fake that retries up to 20 times without sleeping.
#[must_use]
pub fn fake_resource() -> StackSetResource<RecordingStackSetApi> {
    init_tracing();
    StackSetResource::new(
        RecordingStackSetApi::new("us-east-1"),
        RetryPolicy::immediate(RetryPolicy::DEFAULT_ATTEMPTS),
    )
}

/// Build a custom resource event for the `Baseline` resource.
#[must_use]
pub fn event(
    request_type: &str,
    physical_id: Option<&str>,
    properties: Value,
    old_properties: Option<Value>,
) -> CustomResourceRequest {
    let mut event = json!({
        "RequestType": request_type,
        "ResponseURL": "https://cloudformation-custom-resource-response.s3.amazonaws.com/signed",
        "StackId": STACK_ID,
        "RequestId": "5d478078-8a5d-4b1c-9b5e-1d2e3f4a5b6c",
        "ResourceType": "Custom::StackSet",
        "LogicalResourceId": "Baseline",
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:stackset-resource",
        "ResourceProperties": properties,
    });
    if let Some(id) = physical_id {
        event["PhysicalResourceId"] = json!(id);
    }
    if let Some(old) = old_properties {
        event["OldResourceProperties"] = old;
    }
    serde_json::from_value(event).unwrap_or_else(|e| panic!("invalid test event: {e}"))
}

/// Resource properties with the given instance declarations.
#[must_use]
pub fn properties(stack_instances: Value) -> Value {
    json!({
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:stackset-resource",
        "TemplateURL": "https://templates.s3.amazonaws.com/baseline.yaml",
        "Capabilities": ["CAPABILITY_NAMED_IAM"],
        "Parameters": [{"Environment": "prod"}],
        "Tags": [{"Owner": "platform"}],
        "StackInstances": stack_instances,
    })
}

mod test_create;
mod test_delete;
mod test_live;
mod test_update;
