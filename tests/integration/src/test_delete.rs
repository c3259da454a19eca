//! Delete event integration tests.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stackset_core::StackSetError;
    use stackset_core::testing::Call;
    use stackset_model::{ApiError, ApiErrorCode, api_error};

    use crate::{STACK_SET_ID, event, fake_resource, properties};

    fn declared() -> serde_json::Value {
        properties(json!([
            {"Accounts": ["111111111111"], "Regions": ["us-east-1", "us-west-2"]},
            {"Accounts": [""], "Regions": [""]},
            {"Accounts": ["222222222222"], "Regions": ["eu-west-1"], "ParameterOverrides": [{"A": "b"}]}
        ]))
    }

    #[tokio::test]
    async fn test_should_delete_instances_then_stack_set() {
        let resource = fake_resource();

        let output = resource
            .handle(&event("Delete", Some(STACK_SET_ID), declared(), None))
            .await
            .unwrap();
        assert_eq!(output.physical_resource_id, STACK_SET_ID);
        assert!(output.data.is_empty());

        let calls = resource.api().calls();
        let operations: Vec<_> = calls.iter().map(Call::operation).collect();
        assert_eq!(
            operations,
            vec!["DeleteStackInstances", "DeleteStackInstances", "DeleteStackSet"]
        );
        assert_eq!(calls[1].instances().unwrap().accounts, vec!["222222222222"]);
        assert!(calls[1].instances().unwrap().parameter_overrides.is_empty());
    }

    #[tokio::test]
    async fn test_should_ignore_rollback_of_failed_create() {
        let resource = fake_resource();

        let output = resource
            .handle(&event("Delete", Some("NONE"), declared(), None))
            .await
            .unwrap();
        assert_eq!(output.physical_resource_id, "NONE");
        assert!(resource.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_delete_stack_set_even_if_instances_fail() {
        let resource = fake_resource();
        resource.api().fail_next(
            "DeleteStackInstances",
            ApiError::new(
                ApiErrorCode::Unknown("AccessDenied".to_owned()),
                "not allowed",
            ),
        );

        resource
            .handle(&event("Delete", Some(STACK_SET_ID), declared(), None))
            .await
            .unwrap();
        assert_eq!(resource.api().calls_to("DeleteStackSet").len(), 1);
    }

    #[tokio::test]
    async fn test_should_fail_when_stacks_remain() {
        let resource = fake_resource();
        resource
            .api()
            .fail_next("DeleteStackSet", api_error!(StackSetNotEmptyException));

        let err = resource
            .handle(&event("Delete", Some(STACK_SET_ID), declared(), None))
            .await
            .unwrap_err();
        assert!(matches!(err.source, StackSetError::StackSetNotEmpty { .. }));
        assert_eq!(
            err.to_string(),
            format!("There are still stacks in set {STACK_SET_ID}. You must delete these first.")
        );
    }

    #[tokio::test]
    async fn test_should_retry_stack_set_deletion_while_in_progress() {
        let resource = fake_resource();
        resource.api().fail_times(
            "DeleteStackSet",
            api_error!(OperationInProgressException),
            5,
        );

        resource
            .handle(&event("Delete", Some(STACK_SET_ID), properties(json!([])), None))
            .await
            .unwrap();
        assert_eq!(resource.api().calls_to("DeleteStackSet").len(), 6);
        assert!(resource.api().calls_to("DeleteStackInstances").is_empty());
    }

    #[tokio::test]
    async fn test_should_treat_missing_stack_set_as_deleted() {
        let resource = fake_resource();
        resource
            .api()
            .fail_next("DeleteStackSet", api_error!(StackSetNotFoundException));

        resource
            .handle(&event("Delete", Some(STACK_SET_ID), properties(json!([])), None))
            .await
            .unwrap();
    }
}
