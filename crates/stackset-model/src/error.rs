//! CloudFormation API error types.
//!
//! The StackSet API reports failures with a short error code string
//! (e.g. `OperationInProgressException`). [`ApiErrorCode`] names the codes the
//! resource reacts to; everything else is carried verbatim in
//! [`ApiErrorCode::Unknown`].

use std::fmt;

/// Well-known CloudFormation StackSet error codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    /// Another operation is running against the same StackSet.
    OperationInProgressException,
    /// The StackSet does not exist.
    StackSetNotFoundException,
    /// A StackSet with the requested name already exists.
    NameAlreadyExistsException,
    /// The StackSet still has stack instances.
    StackSetNotEmptyException,
    /// Any other code, or none at all.
    Unknown(String),
}

impl ApiErrorCode {
    /// Parse an error code string as returned by the service.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "OperationInProgressException" => Self::OperationInProgressException,
            "StackSetNotFoundException" => Self::StackSetNotFoundException,
            "NameAlreadyExistsException" => Self::NameAlreadyExistsException,
            "StackSetNotEmptyException" => Self::StackSetNotEmptyException,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OperationInProgressException => "OperationInProgressException",
            Self::StackSetNotFoundException => "StackSetNotFoundException",
            Self::NameAlreadyExistsException => "NameAlreadyExistsException",
            Self::StackSetNotEmptyException => "StackSetNotEmptyException",
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by a StackSet API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// The error code.
    pub code: ApiErrorCode,
    /// A human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Create a new `ApiError` from a code and message.
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an error that has no service error code (transport, build errors).
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Unknown(String::new()), message)
    }

    /// Whether the call was rejected because another operation is running.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.code == ApiErrorCode::OperationInProgressException
    }
}

/// Create an [`ApiError`] from a well-known error code.
///
/// # Examples
///
/// ```
/// use stackset_model::api_error;
/// use stackset_model::error::ApiErrorCode;
///
/// let err = api_error!(OperationInProgressException);
/// assert!(err.is_in_progress());
///
/// let err = api_error!(StackSetNotFoundException, "StackSet demo not found");
/// assert_eq!(err.code, ApiErrorCode::StackSetNotFoundException);
/// ```
#[macro_export]
macro_rules! api_error {
    ($code:ident) => {
        $crate::error::ApiError::new(
            $crate::error::ApiErrorCode::$code,
            $crate::error::ApiErrorCode::$code.as_str(),
        )
    };
    ($code:ident, $msg:expr) => {
        $crate::error::ApiError::new($crate::error::ApiErrorCode::$code, $msg)
    };
}
