//! Resource properties of the `Custom::StackSet` resource.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kv::KeyValue;

/// The `ResourceProperties` (or `OldResourceProperties`) of an event.
///
/// CloudFormation passes every leaf value as a string. Unknown keys such as
/// `ServiceToken` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    /// Explicit StackSet name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_set_name: Option<String>,
    /// StackSet description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_set_description: Option<String>,
    /// S3 URL of the template. Required on create.
    #[serde(rename = "TemplateURL", skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,
    /// Template parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<KeyValue>>,
    /// Capabilities such as `CAPABILITY_NAMED_IAM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    /// StackSet tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<KeyValue>>,
    /// ARN of the administration role.
    #[serde(rename = "AdministrationRoleARN", skip_serializing_if = "Option::is_none")]
    pub administration_role_arn: Option<String>,
    /// Name of the execution role assumed in target accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_role_name: Option<String>,
    /// Raw operation preferences, coerced before use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_preferences: Option<Map<String, Value>>,
    /// Declared stack instance groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_instances: Option<Vec<StackInstancesSpec>>,
}

impl ResourceProperties {
    /// Parse properties from the raw event object.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map.clone()))
    }

    /// Declared stack instance groups, empty when absent.
    #[must_use]
    pub fn stack_instances(&self) -> &[StackInstancesSpec] {
        self.stack_instances.as_deref().unwrap_or_default()
    }
}

/// A compact `{Accounts, Regions, ParameterOverrides}` instance group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackInstancesSpec {
    /// Target account ids.
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Target regions.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Parameter overrides applied to every (account, region) cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_overrides: Option<Vec<KeyValue>>,
}

impl StackInstancesSpec {
    /// Parameter overrides, empty when absent.
    #[must_use]
    pub fn overrides(&self) -> &[KeyValue] {
        self.parameter_overrides.as_deref().unwrap_or_default()
    }

    /// Whether at least one account is listed.
    #[must_use]
    pub fn has_accounts(&self) -> bool {
        !is_blank(&self.accounts)
    }

    /// Whether at least one region is listed.
    #[must_use]
    pub fn has_regions(&self) -> bool {
        !is_blank(&self.regions)
    }
}

/// A list is blank when empty or when its first entry is `""`.
///
/// Templates commonly feed `!Split [",", !Ref Param]` into these lists, which
/// yields `[""]` for an empty parameter.
fn is_blank(list: &[String]) -> bool {
    list.first().is_none_or(String::is_empty)
}
