//! Stack ARN and StackSet id helpers.

use crate::error::{StackSetError, StackSetResult};

/// Extract the stack name from a CloudFormation stack ARN.
///
/// ```
/// use stackset_core::arn::stack_name_from_arn;
///
/// let arn = "arn:aws:cloudformation:us-east-1:123456789012:stack/parent/0f1e2d3c";
/// assert_eq!(stack_name_from_arn(arn).unwrap(), "parent");
/// ```
pub fn stack_name_from_arn(arn: &str) -> StackSetResult<&str> {
    let resource = arn
        .splitn(6, ':')
        .nth(5)
        .ok_or_else(|| StackSetError::InvalidArn(arn.to_owned()))?;

    let name = if let Some((_, name)) = resource.split_once(':') {
        name
    } else if resource.contains('/') {
        resource
            .split('/')
            .nth(1)
            .ok_or_else(|| StackSetError::InvalidArn(arn.to_owned()))?
    } else {
        resource
    };
    Ok(name)
}

/// Strip the `:<uuid>` suffix from a StackSet id.
///
/// `UpdateStackInstances` only accepts the StackSet name.
#[must_use]
pub fn stack_set_name_from_id(stack_set_id: &str) -> &str {
    stack_set_id
        .split_once(':')
        .map_or(stack_set_id, |(name, _)| name)
}
