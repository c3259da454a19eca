//! Error types for StackSet lifecycle handling.
//!
//! Every variant is terminal: it ends the current event and its display text
//! becomes the `Reason` of the FAILED response.

use stackset_model::ApiError;

/// Core error type for the StackSet custom resource.
#[derive(Debug, thiserror::Error)]
pub enum StackSetError {
    /// The same (account, region) pair is declared by more than one group.
    #[error("{account} / {region} is defined multiple times")]
    DuplicateInstance {
        /// Account id of the duplicated pair.
        account: String,
        /// Region of the duplicated pair.
        region: String,
    },

    /// Regions were given without accounts.
    #[error("You must specify at least one account with a list of regions.")]
    MissingAccounts,

    /// Accounts were given without regions.
    #[error("You must specify at least one region with a list of accounts.")]
    MissingRegions,

    /// A required property is absent from both the new and old properties.
    #[error("{0} not found during {1} event")]
    MissingProperty(&'static str, &'static str),

    /// The event carries no physical resource id.
    #[error("PhysicalResourceId is missing from the {0} event")]
    MissingPhysicalId(&'static str),

    /// The resource properties could not be parsed.
    #[error("invalid resource properties: {0}")]
    InvalidProperties(#[from] serde_json::Error),

    /// A stack ARN did not have the `arn:partition:service:region:account:resource` shape.
    #[error("invalid stack ARN: {0}")]
    InvalidArn(String),

    /// An operation preference could not be coerced.
    #[error("invalid value {value:?} for operation preference {key}")]
    InvalidOperationPreference {
        /// The preference key.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// The StackSet name is taken.
    #[error("A StackSet called {name} already exists.")]
    NameAlreadyExists {
        /// The requested name.
        name: String,
    },

    /// The StackSet does not exist in the target region.
    #[error(
        "No StackSet matching {stack_set} found in {region}. You must create before launching stacks."
    )]
    StackSetNotFound {
        /// StackSet name or id.
        stack_set: String,
        /// Region that was searched.
        region: String,
    },

    /// The StackSet still holds stack instances.
    #[error("There are still stacks in set {stack_set}. You must delete these first.")]
    StackSetNotEmpty {
        /// StackSet name or id.
        stack_set: String,
    },

    /// The in-progress retry budget ran out.
    #[error("Failed to {action} after {attempts} tries.")]
    RetriesExhausted {
        /// What was being attempted, e.g. `launch stacks`.
        action: &'static str,
        /// Number of calls made.
        attempts: u32,
    },

    /// Any other API failure.
    #[error("Unexpected error while trying to {action}: {source}")]
    Api {
        /// What was being attempted.
        action: &'static str,
        /// The API error.
        #[source]
        source: ApiError,
    },
}

/// Convenience result type for StackSet operations.
pub type StackSetResult<T> = Result<T, StackSetError>;

#[cfg(test)]
mod tests {
    use stackset_model::ApiErrorCode;

    use super::*;

    #[test]
    fn test_should_format_duplicate_instance() {
        let err = StackSetError::DuplicateInstance {
            account: "111111111111".to_owned(),
            region: "us-east-1".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "111111111111 / us-east-1 is defined multiple times"
        );
    }

    #[test]
    fn test_should_format_exhausted_retries() {
        let err = StackSetError::RetriesExhausted {
            action: "launch stacks",
            attempts: 20,
        };
        assert_eq!(err.to_string(), "Failed to launch stacks after 20 tries.");
    }

    #[test]
    fn test_should_expose_api_source() {
        let err = StackSetError::Api {
            action: "update stack set",
            source: ApiError::new(
                ApiErrorCode::Unknown("ValidationError".to_owned()),
                "bad template",
            ),
        };
        assert!(err.to_string().contains("bad template"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
