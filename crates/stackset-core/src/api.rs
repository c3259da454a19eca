//! The StackSet API boundary.
//!
//! [`StackSetApi`] is the seam between lifecycle logic and the CloudFormation
//! service. Production code uses [`crate::client::CloudFormationStackSets`];
//! tests substitute a recording fake.

use std::fmt::Debug;

use stackset_model::ApiError;

use crate::preferences::OperationPreferences;

/// A template parameter or parameter override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// `ParameterKey`.
    pub key: String,
    /// `ParameterValue`.
    pub value: String,
}

/// A StackSet tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// StackSet-level attributes shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSetDefinition {
    /// Description.
    pub description: String,
    /// S3 URL of the template.
    pub template_url: String,
    /// Template parameters.
    pub parameters: Vec<Parameter>,
    /// Acknowledged capabilities.
    pub capabilities: Vec<String>,
    /// Tags propagated to every stack instance.
    pub tags: Vec<Tag>,
    /// Administration role; the service default when `None`.
    pub administration_role_arn: Option<String>,
    /// Execution role name; the service default when `None`.
    pub execution_role_name: Option<String>,
}

/// Target of a stack instance operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackInstancesInput {
    /// StackSet name or id.
    pub stack_set: String,
    /// Target accounts.
    pub accounts: Vec<String>,
    /// Target regions.
    pub regions: Vec<String>,
    /// Overrides; ignored on delete.
    pub parameter_overrides: Vec<Parameter>,
    /// Operation preferences.
    pub preferences: OperationPreferences,
}

/// CloudFormation StackSet operations used by the resource.
///
/// Mutating instance calls return the operation id when the service reports
/// one.
#[async_trait::async_trait]
pub trait StackSetApi: Send + Sync + Debug {
    /// Region the StackSet lives in.
    fn region(&self) -> &str;

    /// `CreateStackSet`; returns the StackSet id.
    async fn create_stack_set(
        &self,
        name: &str,
        definition: &StackSetDefinition,
    ) -> Result<String, ApiError>;

    /// `UpdateStackSet`.
    async fn update_stack_set(
        &self,
        stack_set: &str,
        definition: &StackSetDefinition,
        preferences: &OperationPreferences,
    ) -> Result<Option<String>, ApiError>;

    /// `DeleteStackSet`.
    async fn delete_stack_set(&self, stack_set: &str) -> Result<(), ApiError>;

    /// `CreateStackInstances`.
    async fn create_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError>;

    /// `UpdateStackInstances`.
    async fn update_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError>;

    /// `DeleteStackInstances`, never retaining the stacks.
    async fn delete_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError>;
}
