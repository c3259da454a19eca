//! [`StackSetApi`] backed by the AWS SDK.

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{
    Capability, Parameter as SdkParameter, RegionConcurrencyType, StackSetOperationPreferences,
    Tag as SdkTag,
};
use stackset_model::{ApiError, ApiErrorCode};
use tracing::debug;

use crate::api::{Parameter, StackInstancesInput, StackSetApi, StackSetDefinition, Tag};
use crate::config::ResourceConfig;
use crate::preferences::OperationPreferences;

/// CloudFormation client scoped to the StackSet's region.
#[derive(Debug, Clone)]
pub struct CloudFormationStackSets {
    client: Client,
    region: String,
}

impl CloudFormationStackSets {
    /// Wrap an existing SDK client.
    #[must_use]
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// Load credentials from the environment and build a client for
    /// `config.region`.
    pub async fn from_config(config: &ResourceConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        debug!(region = %config.region, "cloudformation client configured");
        Self::new(Client::new(&sdk_config), config.region.clone())
    }
}

#[async_trait::async_trait]
impl StackSetApi for CloudFormationStackSets {
    fn region(&self) -> &str {
        &self.region
    }

    async fn create_stack_set(
        &self,
        name: &str,
        definition: &StackSetDefinition,
    ) -> Result<String, ApiError> {
        let output = self
            .client
            .create_stack_set()
            .stack_set_name(name)
            .description(&definition.description)
            .template_url(&definition.template_url)
            .set_parameters(Some(sdk_parameters(&definition.parameters)))
            .set_capabilities(Some(sdk_capabilities(&definition.capabilities)))
            .set_tags(Some(sdk_tags(&definition.tags)))
            .set_administration_role_arn(definition.administration_role_arn.clone())
            .set_execution_role_name(definition.execution_role_name.clone())
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        output
            .stack_set_id()
            .map(ToOwned::to_owned)
            .ok_or_else(|| ApiError::unknown("CreateStackSet returned no StackSetId"))
    }

    async fn update_stack_set(
        &self,
        stack_set: &str,
        definition: &StackSetDefinition,
        preferences: &OperationPreferences,
    ) -> Result<Option<String>, ApiError> {
        let output = self
            .client
            .update_stack_set()
            .stack_set_name(stack_set)
            .description(&definition.description)
            .template_url(&definition.template_url)
            .set_parameters(Some(sdk_parameters(&definition.parameters)))
            .set_capabilities(Some(sdk_capabilities(&definition.capabilities)))
            .set_tags(Some(sdk_tags(&definition.tags)))
            .set_operation_preferences(sdk_preferences(preferences))
            .set_administration_role_arn(definition.administration_role_arn.clone())
            .set_execution_role_name(definition.execution_role_name.clone())
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        Ok(output.operation_id().map(ToOwned::to_owned))
    }

    async fn delete_stack_set(&self, stack_set: &str) -> Result<(), ApiError> {
        self.client
            .delete_stack_set()
            .stack_set_name(stack_set)
            .send()
            .await
            .map_err(|e| api_error(&e))?;
        Ok(())
    }

    async fn create_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError> {
        let output = self
            .client
            .create_stack_instances()
            .stack_set_name(&input.stack_set)
            .set_accounts(Some(input.accounts.clone()))
            .set_regions(Some(input.regions.clone()))
            .set_parameter_overrides(Some(sdk_parameters(&input.parameter_overrides)))
            .set_operation_preferences(sdk_preferences(&input.preferences))
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        Ok(output.operation_id().map(ToOwned::to_owned))
    }

    async fn update_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError> {
        let output = self
            .client
            .update_stack_instances()
            .stack_set_name(&input.stack_set)
            .set_accounts(Some(input.accounts.clone()))
            .set_regions(Some(input.regions.clone()))
            .set_parameter_overrides(Some(sdk_parameters(&input.parameter_overrides)))
            .set_operation_preferences(sdk_preferences(&input.preferences))
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        Ok(output.operation_id().map(ToOwned::to_owned))
    }

    async fn delete_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError> {
        let output = self
            .client
            .delete_stack_instances()
            .stack_set_name(&input.stack_set)
            .set_accounts(Some(input.accounts.clone()))
            .set_regions(Some(input.regions.clone()))
            .set_operation_preferences(sdk_preferences(&input.preferences))
            .retain_stacks(false)
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        Ok(output.operation_id().map(ToOwned::to_owned))
    }
}

/// Convert an SDK failure into an [`ApiError`], keeping the service error code.
fn api_error<E, R>(err: &SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .code()
        .map_or_else(|| ApiErrorCode::Unknown(String::new()), ApiErrorCode::parse);
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(err).to_string(), ToOwned::to_owned);
    ApiError::new(code, message)
}

fn sdk_parameters(params: &[Parameter]) -> Vec<SdkParameter> {
    params
        .iter()
        .map(|p| {
            SdkParameter::builder()
                .parameter_key(&p.key)
                .parameter_value(&p.value)
                .build()
        })
        .collect()
}

fn sdk_tags(tags: &[Tag]) -> Vec<SdkTag> {
    tags.iter()
        .map(|t| SdkTag::builder().key(&t.key).value(&t.value).build())
        .collect()
}

fn sdk_capabilities(capabilities: &[String]) -> Vec<Capability> {
    capabilities
        .iter()
        .map(|c| Capability::from(c.as_str()))
        .collect()
}

fn sdk_preferences(prefs: &OperationPreferences) -> Option<StackSetOperationPreferences> {
    if prefs.is_empty() {
        return None;
    }
    Some(
        StackSetOperationPreferences::builder()
            .set_failure_tolerance_count(prefs.failure_tolerance_count)
            .set_failure_tolerance_percentage(prefs.failure_tolerance_percentage)
            .set_max_concurrent_count(prefs.max_concurrent_count)
            .set_max_concurrent_percentage(prefs.max_concurrent_percentage)
            .set_region_order(prefs.region_order.clone())
            .set_region_concurrency_type(
                prefs
                    .region_concurrency_type
                    .as_deref()
                    .map(RegionConcurrencyType::from),
            )
            .build(),
    )
}
