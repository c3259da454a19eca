//! Lifecycle handlers for the `Custom::StackSet` resource.
//!
//! [`StackSetResource`] turns one custom resource event into the StackSet API
//! calls that bring the StackSet in line with the template:
//!
//! - **Create** creates the StackSet, then launches every declared instance
//!   group.
//! - **Update** updates the StackSet when one of
//!   [`STACK_SET_ATTRIBUTES`](crate::changes::STACK_SET_ATTRIBUTES) changed,
//!   then adds, removes and re-parameterizes instances according to the
//!   flattened diff of old and new instance declarations.
//! - **Delete** tears down every declared instance group and then the
//!   StackSet. A physical id of `NONE` marks the rollback of a create that
//!   never produced a StackSet and is a no-op.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use tracing::{debug, info};

use stackset_model::{CustomResourceRequest, NO_PHYSICAL_ID, RequestType, ResourceProperties};

use crate::api::{StackSetApi, StackSetDefinition};
use crate::arn::{stack_name_from_arn, stack_set_name_from_id};
use crate::changes::{STACK_SET_ATTRIBUTES, change_requires_update};
use crate::error::{StackSetError, StackSetResult};
use crate::instances::{FlatInstances, InstanceGroup};
use crate::operations::{DeleteOutcome, StackSetOps};
use crate::params::{expand_parameters, expand_tags};
use crate::preferences::OperationPreferences;
use crate::retry::RetryPolicy;

/// Result of a successfully handled event.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    /// Physical id to report.
    pub physical_resource_id: String,
    /// `Data` attributes to report.
    pub data: Map<String, Value>,
}

impl HandlerOutput {
    /// Output for a live StackSet: exposes `StackSetId` and `StackSetName`.
    #[must_use]
    pub fn for_stack_set(stack_set_id: &str) -> Self {
        let mut data = Map::new();
        data.insert("StackSetId".to_owned(), Value::from(stack_set_id));
        data.insert(
            "StackSetName".to_owned(),
            Value::from(stack_set_name_from_id(stack_set_id)),
        );
        Self {
            physical_resource_id: stack_set_id.to_owned(),
            data,
        }
    }

    /// Output without data.
    #[must_use]
    pub fn empty(physical_resource_id: impl Into<String>) -> Self {
        Self {
            physical_resource_id: physical_resource_id.into(),
            data: Map::new(),
        }
    }
}

/// A failed event, with the physical id to report when one is known.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct HandlerFailure {
    /// Physical id of a StackSet created before the failure.
    pub physical_resource_id: Option<String>,
    /// What went wrong.
    #[source]
    pub source: StackSetError,
}

impl HandlerFailure {
    /// Failure after the StackSet `stack_set_id` already exists.
    #[must_use]
    pub fn with_id(source: StackSetError, stack_set_id: &str) -> Self {
        Self {
            physical_resource_id: Some(stack_set_id.to_owned()),
            source,
        }
    }
}

impl From<StackSetError> for HandlerFailure {
    fn from(source: StackSetError) -> Self {
        Self {
            physical_resource_id: None,
            source,
        }
    }
}

/// Handler result type.
pub type HandlerResult = Result<HandlerOutput, HandlerFailure>;

/// What one event has done so far, readable after its handler is cancelled.
#[derive(Debug, Default)]
pub struct EventProgress {
    created: OnceLock<String>,
}

impl EventProgress {
    /// Id of the StackSet this event created, if it got that far.
    #[must_use]
    pub fn created_stack_set(&self) -> Option<&str> {
        self.created.get().map(String::as_str)
    }

    fn record_created(&self, stack_set_id: &str) {
        if self.created.set(stack_set_id.to_owned()).is_err() {
            debug!(stack_set_id, "created stack set already recorded");
        }
    }
}

/// The StackSet custom resource.
#[derive(Debug)]
pub struct StackSetResource<A> {
    api: A,
    retry: RetryPolicy,
}

impl<A: StackSetApi> StackSetResource<A> {
    /// Create a resource handler over `api`.
    #[must_use]
    pub fn new(api: A, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// The underlying API client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    fn ops(&self) -> StackSetOps<'_> {
        StackSetOps::new(&self.api, self.retry)
    }

    /// Route `request` to its lifecycle handler.
    pub async fn handle(&self, request: &CustomResourceRequest) -> HandlerResult {
        self.handle_tracked(request, &EventProgress::default()).await
    }

    /// Like [`handle`](Self::handle), recording into `progress` what a
    /// cancelled caller needs to report.
    pub async fn handle_tracked(
        &self,
        request: &CustomResourceRequest,
        progress: &EventProgress,
    ) -> HandlerResult {
        match request.request_type {
            RequestType::Create => self.create_tracked(request, progress).await,
            RequestType::Update => self.update(request).await,
            RequestType::Delete => self.delete(request).await,
        }
    }

    /// Handle a create event.
    pub async fn create(&self, request: &CustomResourceRequest) -> HandlerResult {
        self.create_tracked(request, &EventProgress::default()).await
    }

    async fn create_tracked(
        &self,
        request: &CustomResourceRequest,
        progress: &EventProgress,
    ) -> HandlerResult {
        let props = request.properties().map_err(StackSetError::from)?;
        let parent = stack_name_from_arn(&request.stack_id)?;

        let name = props
            .stack_set_name
            .clone()
            .unwrap_or_else(|| format!("{parent}-{}", request.logical_resource_id));
        let preferences =
            OperationPreferences::from_optional(props.operation_preferences.as_ref())?;
        let template_url = props
            .template_url
            .clone()
            .ok_or(StackSetError::MissingProperty("TemplateURL", "create"))?;

        // Reject bad instance declarations before anything is created.
        FlatInstances::flatten(props.stack_instances())?;
        let mut groups = Vec::new();
        for spec in props.stack_instances() {
            match (spec.has_accounts(), spec.has_regions()) {
                (true, true) => groups.push(InstanceGroup::from_spec(spec)),
                (false, true) => return Err(StackSetError::MissingAccounts.into()),
                (true, false) => return Err(StackSetError::MissingRegions.into()),
                (false, false) => debug!("skipping empty stack instance group"),
            }
        }

        let definition = StackSetDefinition {
            description: props
                .stack_set_description
                .clone()
                .unwrap_or_else(|| default_description(parent)),
            template_url,
            parameters: expand_parameters(props.parameters.as_deref().unwrap_or_default()),
            capabilities: props.capabilities.clone().unwrap_or_default(),
            tags: expand_tags(props.tags.as_deref().unwrap_or_default()),
            administration_role_arn: props.administration_role_arn.clone(),
            execution_role_name: props.execution_role_name.clone(),
        };

        let ops = self.ops();
        let stack_set_id = ops.create_stack_set(&name, &definition).await?;
        info!(stack_set_id = %stack_set_id, "created stack set");
        progress.record_created(&stack_set_id);

        for group in &groups {
            ops.launch_stacks(&stack_set_id, group, &preferences)
                .await
                .map_err(|e| HandlerFailure::with_id(e, &stack_set_id))?;
        }

        Ok(HandlerOutput::for_stack_set(&stack_set_id))
    }

    /// Handle an update event.
    pub async fn update(&self, request: &CustomResourceRequest) -> HandlerResult {
        let stack_set_id = request
            .physical_resource_id
            .as_deref()
            .ok_or(StackSetError::MissingPhysicalId("Update"))?;
        let props = request.properties().map_err(StackSetError::from)?;
        let old_props = request.old_properties().map_err(StackSetError::from)?;
        let preferences =
            OperationPreferences::from_optional(props.operation_preferences.as_ref())?;
        debug!(?preferences, "operation preferences");

        let new_instances = FlatInstances::flatten(props.stack_instances())?;
        let old_instances = FlatInstances::flatten(old_props.stack_instances())?;

        let ops = self.ops();
        if change_requires_update(
            STACK_SET_ATTRIBUTES,
            &request.old_resource_properties,
            &request.resource_properties,
        ) {
            info!("changes impacting stack set detected");
            let definition = merged_definition(&request.stack_id, &props, &old_props)?;
            ops.update_stack_set(stack_set_id, &definition, &preferences)
                .await?;
        }

        info!("evaluating stack instances");
        let diff = FlatInstances::diff(&old_instances, &new_instances);
        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            unchanged = diff.unchanged.len(),
            "stack instance diff"
        );

        for group in new_instances.aggregate(&diff.added) {
            ops.launch_stacks(stack_set_id, &group, &preferences).await?;
        }
        for group in old_instances.aggregate(&diff.removed) {
            report_delete(&ops.delete_stacks(stack_set_id, &group, &preferences).await);
        }
        for group in new_instances.aggregate(&diff.changed) {
            ops.update_stacks(stack_set_id, &group, &preferences).await?;
        }

        Ok(HandlerOutput::for_stack_set(stack_set_id))
    }

    /// Handle a delete event.
    pub async fn delete(&self, request: &CustomResourceRequest) -> HandlerResult {
        let stack_set_id = request
            .physical_resource_id
            .as_deref()
            .ok_or(StackSetError::MissingPhysicalId("Delete"))?;
        if stack_set_id == NO_PHYSICAL_ID {
            info!("rollback of a failed create, nothing to delete");
            return Ok(HandlerOutput::empty(stack_set_id));
        }

        let props = request.properties().map_err(StackSetError::from)?;
        let ops = self.ops();

        if !props.stack_instances().is_empty() {
            let preferences =
                OperationPreferences::from_optional(props.operation_preferences.as_ref())?;
            info!(stack_set_id, "removing existing stacks from stack set");
            for spec in props.stack_instances() {
                if !(spec.has_accounts() && spec.has_regions()) {
                    debug!("skipping empty stack instance group");
                    continue;
                }
                let group = InstanceGroup {
                    overrides: Vec::new(),
                    ..InstanceGroup::from_spec(spec)
                };
                report_delete(&ops.delete_stacks(stack_set_id, &group, &preferences).await);
            }
        }

        ops.delete_stack_set(stack_set_id).await?;
        Ok(HandlerOutput::empty(stack_set_id))
    }
}

fn default_description(parent: &str) -> String {
    format!("This StackSet belongs to the CloudFormation stack {parent}.")
}

fn report_delete(outcome: &DeleteOutcome) {
    debug!(?outcome, "delete stack instances");
}

/// StackSet attributes for an update: each property from the new template,
/// else from the old one, else its default.
fn merged_definition(
    stack_id: &str,
    new: &ResourceProperties,
    old: &ResourceProperties,
) -> StackSetResult<StackSetDefinition> {
    let description = match new
        .stack_set_description
        .as_ref()
        .or(old.stack_set_description.as_ref())
    {
        Some(description) => description.clone(),
        None => default_description(stack_name_from_arn(stack_id)?),
    };
    let template_url = new
        .template_url
        .as_ref()
        .or(old.template_url.as_ref())
        .cloned()
        .ok_or(StackSetError::MissingProperty("TemplateURL", "update"))?;

    let definition = StackSetDefinition {
        description,
        template_url,
        parameters: expand_parameters(
            new.parameters
                .as_deref()
                .or(old.parameters.as_deref())
                .unwrap_or_default(),
        ),
        capabilities: new
            .capabilities
            .as_ref()
            .or(old.capabilities.as_ref())
            .cloned()
            .unwrap_or_default(),
        tags: expand_tags(
            new.tags
                .as_deref()
                .or(old.tags.as_deref())
                .unwrap_or_default(),
        ),
        administration_role_arn: new
            .administration_role_arn
            .clone()
            .or_else(|| old.administration_role_arn.clone()),
        execution_role_name: new
            .execution_role_name
            .clone()
            .or_else(|| old.execution_role_name.clone()),
    };
    debug!(?definition, "stack set definition");
    Ok(definition)
}
