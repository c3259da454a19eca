//! In-memory [`StackSetApi`] for tests.
//!
//! [`RecordingStackSetApi`] records every call, including failed ones, and
//! answers with scripted errors queued per operation name. StackSet ids are
//! `"{name}:0001"`.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use stackset_model::ApiError;

use crate::api::{StackInstancesInput, StackSetApi, StackSetDefinition};
use crate::preferences::OperationPreferences;

/// A recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `CreateStackSet`.
    CreateStackSet {
        /// Requested name.
        name: String,
        /// Attributes.
        definition: StackSetDefinition,
    },
    /// `UpdateStackSet`.
    UpdateStackSet {
        /// Target StackSet.
        stack_set: String,
        /// Attributes.
        definition: StackSetDefinition,
        /// Preferences.
        preferences: OperationPreferences,
    },
    /// `DeleteStackSet`.
    DeleteStackSet {
        /// Target StackSet.
        stack_set: String,
    },
    /// `CreateStackInstances`.
    CreateStackInstances(StackInstancesInput),
    /// `UpdateStackInstances`.
    UpdateStackInstances(StackInstancesInput),
    /// `DeleteStackInstances`.
    DeleteStackInstances(StackInstancesInput),
}

impl Call {
    /// Operation name, as used by [`RecordingStackSetApi::fail_next`].
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::CreateStackSet { .. } => "CreateStackSet",
            Self::UpdateStackSet { .. } => "UpdateStackSet",
            Self::DeleteStackSet { .. } => "DeleteStackSet",
            Self::CreateStackInstances(_) => "CreateStackInstances",
            Self::UpdateStackInstances(_) => "UpdateStackInstances",
            Self::DeleteStackInstances(_) => "DeleteStackInstances",
        }
    }

    /// Instance input of an instance call.
    #[must_use]
    pub fn instances(&self) -> Option<&StackInstancesInput> {
        match self {
            Self::CreateStackInstances(input)
            | Self::UpdateStackInstances(input)
            | Self::DeleteStackInstances(input) => Some(input),
            _ => None,
        }
    }
}

/// Recording fake of the StackSet API.
#[derive(Debug)]
pub struct RecordingStackSetApi {
    region: String,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, VecDeque<ApiError>>>,
}

impl RecordingStackSetApi {
    /// A fake for `region` that accepts every call.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Fail the next call to `operation` with `error`.
    pub fn fail_next(&self, operation: &'static str, error: ApiError) {
        self.fail_times(operation, error, 1);
    }

    /// Fail the next `times` calls to `operation` with `error`.
    pub fn fail_times(&self, operation: &'static str, error: ApiError, times: usize) {
        let mut failures = self.failures.lock();
        let queue = failures.entry(operation).or_default();
        queue.extend(std::iter::repeat_n(error, times));
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls made to `operation`.
    #[must_use]
    pub fn calls_to(&self, operation: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        let operation = call.operation();
        self.calls.lock().push(call);
        match self
            .failures
            .lock()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl StackSetApi for RecordingStackSetApi {
    fn region(&self) -> &str {
        &self.region
    }

    async fn create_stack_set(
        &self,
        name: &str,
        definition: &StackSetDefinition,
    ) -> Result<String, ApiError> {
        self.record(Call::CreateStackSet {
            name: name.to_owned(),
            definition: definition.clone(),
        })?;
        Ok(format!("{name}:0001"))
    }

    async fn update_stack_set(
        &self,
        stack_set: &str,
        definition: &StackSetDefinition,
        preferences: &OperationPreferences,
    ) -> Result<Option<String>, ApiError> {
        self.record(Call::UpdateStackSet {
            stack_set: stack_set.to_owned(),
            definition: definition.clone(),
            preferences: preferences.clone(),
        })?;
        Ok(Some("op-update-stack-set".to_owned()))
    }

    async fn delete_stack_set(&self, stack_set: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteStackSet {
            stack_set: stack_set.to_owned(),
        })
    }

    async fn create_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError> {
        self.record(Call::CreateStackInstances(input.clone()))?;
        Ok(Some("op-create-instances".to_owned()))
    }

    async fn update_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError> {
        self.record(Call::UpdateStackInstances(input.clone()))?;
        Ok(Some("op-update-instances".to_owned()))
    }

    async fn delete_stack_instances(
        &self,
        input: &StackInstancesInput,
    ) -> Result<Option<String>, ApiError> {
        self.record(Call::DeleteStackInstances(input.clone()))?;
        Ok(Some("op-delete-instances".to_owned()))
    }
}
