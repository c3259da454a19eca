//! Retrying wrappers around individual StackSet API calls.
//!
//! Each wrapper owns the failure policy of its call: which error codes are
//! translated into a descriptive [`StackSetError`], and whether a failure
//! aborts the event or is only reported. Deleting stack instances is the one
//! reported path; a delete that cannot tear down an instance group still goes
//! on to the next group and to the StackSet itself.

use tracing::{debug, info, warn};

use stackset_model::ApiErrorCode;

use crate::api::{StackInstancesInput, StackSetApi, StackSetDefinition};
use crate::arn::stack_set_name_from_id;
use crate::error::{StackSetError, StackSetResult};
use crate::instances::InstanceGroup;
use crate::params::expand_parameters;
use crate::preferences::OperationPreferences;
use crate::retry::{RetryError, RetryPolicy, retry_in_progress};

/// Outcome of a stack instance deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The service accepted the request.
    Submitted {
        /// Operation id, when reported.
        operation_id: Option<String>,
    },
    /// The request failed; the reason was logged.
    Failed {
        /// Failure description.
        reason: String,
    },
}

/// StackSet calls bound to one API client and retry policy.
#[derive(Debug, Clone, Copy)]
pub struct StackSetOps<'a> {
    api: &'a dyn StackSetApi,
    retry: RetryPolicy,
}

impl<'a> StackSetOps<'a> {
    /// Bind `api` with `retry`.
    #[must_use]
    pub fn new(api: &'a dyn StackSetApi, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// Create the StackSet and return its id. Not retried.
    pub async fn create_stack_set(
        &self,
        name: &str,
        definition: &StackSetDefinition,
    ) -> StackSetResult<String> {
        self.api
            .create_stack_set(name, definition)
            .await
            .map_err(|e| match e.code {
                ApiErrorCode::NameAlreadyExistsException => StackSetError::NameAlreadyExists {
                    name: name.to_owned(),
                },
                _ => StackSetError::Api {
                    action: "create stack set",
                    source: e,
                },
            })
    }

    /// Launch stack instances for `group`.
    pub async fn launch_stacks(
        &self,
        stack_set: &str,
        group: &InstanceGroup,
        preferences: &OperationPreferences,
    ) -> StackSetResult<Option<String>> {
        info!(
            stack_set,
            accounts = ?group.accounts,
            regions = ?group.regions,
            "launching stack instances"
        );
        let input = instances_input(stack_set, group, preferences);
        let result = retry_in_progress(&self.retry, stack_set, || {
            self.api.create_stack_instances(&input)
        })
        .await;
        self.instances_result("launch stacks", stack_set, result)
    }

    /// Update the overrides of existing stack instances in `group`.
    ///
    /// `UpdateStackInstances` only accepts the StackSet name, so a StackSet id
    /// is truncated first.
    pub async fn update_stacks(
        &self,
        stack_set: &str,
        group: &InstanceGroup,
        preferences: &OperationPreferences,
    ) -> StackSetResult<Option<String>> {
        let name = stack_set_name_from_id(stack_set);
        info!(
            stack_set = name,
            accounts = ?group.accounts,
            regions = ?group.regions,
            "updating stack instances"
        );
        let input = instances_input(name, group, preferences);
        let result = retry_in_progress(&self.retry, name, || {
            self.api.update_stack_instances(&input)
        })
        .await;
        self.instances_result("update stacks", name, result)
    }

    /// Delete the stack instances in `group`. Failures are reported, not raised.
    pub async fn delete_stacks(
        &self,
        stack_set: &str,
        group: &InstanceGroup,
        preferences: &OperationPreferences,
    ) -> DeleteOutcome {
        info!(
            stack_set,
            accounts = ?group.accounts,
            regions = ?group.regions,
            "deleting stack instances"
        );
        let input = instances_input(stack_set, group, preferences);
        let result = retry_in_progress(&self.retry, stack_set, || {
            self.api.delete_stack_instances(&input)
        })
        .await;

        match self.instances_result("delete stacks", stack_set, result) {
            Ok(operation_id) => DeleteOutcome::Submitted { operation_id },
            Err(e) => {
                warn!(stack_set, error = %e, "failed to delete stack instances");
                DeleteOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Update StackSet-level attributes.
    pub async fn update_stack_set(
        &self,
        stack_set: &str,
        definition: &StackSetDefinition,
        preferences: &OperationPreferences,
    ) -> StackSetResult<Option<String>> {
        info!(stack_set, "updating stack set");
        let result = retry_in_progress(&self.retry, stack_set, || {
            self.api.update_stack_set(stack_set, definition, preferences)
        })
        .await;
        stack_set_result("update stack set", stack_set, result)
    }

    /// Delete the StackSet. A StackSet that no longer exists counts as deleted.
    pub async fn delete_stack_set(&self, stack_set: &str) -> StackSetResult<()> {
        info!(stack_set, "deleting stack set");
        let result =
            retry_in_progress(&self.retry, stack_set, || self.api.delete_stack_set(stack_set))
                .await;
        match result {
            Err(RetryError::Api(e)) if e.code == ApiErrorCode::StackSetNotFoundException => {
                info!(stack_set, "stack set already deleted");
                Ok(())
            }
            other => stack_set_result("delete stack set", stack_set, other),
        }
    }

    fn instances_result(
        &self,
        action: &'static str,
        stack_set: &str,
        result: Result<Option<String>, RetryError>,
    ) -> StackSetResult<Option<String>> {
        match result {
            Ok(operation_id) => {
                debug!(stack_set, ?operation_id, action, "request accepted");
                Ok(operation_id)
            }
            Err(RetryError::Exhausted { attempts }) => {
                Err(StackSetError::RetriesExhausted { action, attempts })
            }
            Err(RetryError::Api(e)) if e.code == ApiErrorCode::StackSetNotFoundException => {
                Err(StackSetError::StackSetNotFound {
                    stack_set: stack_set.to_owned(),
                    region: self.api.region().to_owned(),
                })
            }
            Err(RetryError::Api(source)) => Err(StackSetError::Api { action, source }),
        }
    }
}

fn instances_input(
    stack_set: &str,
    group: &InstanceGroup,
    preferences: &OperationPreferences,
) -> StackInstancesInput {
    let input = StackInstancesInput {
        stack_set: stack_set.to_owned(),
        accounts: group.accounts.clone(),
        regions: group.regions.clone(),
        parameter_overrides: expand_parameters(&group.overrides),
        preferences: preferences.clone(),
    };
    debug!(?input, "stack instances request");
    input
}

fn stack_set_result<T>(
    action: &'static str,
    stack_set: &str,
    result: Result<T, RetryError>,
) -> StackSetResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(RetryError::Exhausted { attempts }) => {
            Err(StackSetError::RetriesExhausted { action, attempts })
        }
        Err(RetryError::Api(e)) if e.code == ApiErrorCode::StackSetNotEmptyException => {
            Err(StackSetError::StackSetNotEmpty {
                stack_set: stack_set.to_owned(),
            })
        }
        Err(RetryError::Api(source)) => Err(StackSetError::Api { action, source }),
    }
}
