//! Wire types for the CloudFormation StackSet custom resource.
//!
//! This crate holds everything that crosses a boundary: the custom resource
//! request and response documents, the typed resource properties, and the
//! error codes returned by the StackSet API.

pub mod error;
pub mod kv;
pub mod properties;
pub mod request;
pub mod response;

pub use error::{ApiError, ApiErrorCode};
pub use kv::KeyValue;
pub use properties::{ResourceProperties, StackInstancesSpec};
pub use request::{CustomResourceRequest, NO_PHYSICAL_ID, RequestType};
pub use response::{CustomResourceResponse, ResponseStatus};
