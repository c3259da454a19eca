//! StackSet lifecycle management for the `Custom::StackSet` resource.
//!
//! This crate turns CloudFormation custom resource events into StackSet API
//! calls. It flattens the template's instance declarations into
//! `(account, region)` cells, diffs them across updates, regroups the result
//! into as few API calls as possible, and retries calls rejected while
//! another StackSet operation is running.
//!
//! # Architecture
//!
//! ```text
//! StackSetResource (create / update / delete)
//!        |
//!        v
//! StackSetOps (retry + error translation per call)
//!        |
//!        v
//! StackSetApi (CloudFormationStackSets or a test fake)
//! ```

pub mod api;
pub mod arn;
pub mod changes;
pub mod client;
pub mod config;
pub mod error;
pub mod instances;
pub mod operations;
pub mod params;
pub mod preferences;
pub mod resource;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::StackSetApi;
pub use client::CloudFormationStackSets;
pub use config::ResourceConfig;
pub use error::{StackSetError, StackSetResult};
pub use resource::{
    EventProgress, HandlerFailure, HandlerOutput, HandlerResult, StackSetResource,
};
pub use retry::RetryPolicy;
