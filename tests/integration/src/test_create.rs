//! Create event integration tests.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stackset_core::StackSetError;
    use stackset_core::testing::Call;
    use stackset_model::api_error;

    use crate::{STACK_SET_ID, event, fake_resource, properties};

    #[tokio::test]
    async fn test_should_create_stack_set_and_launch_each_spec() {
        let resource = fake_resource();
        let req = event(
            "Create",
            None,
            properties(json!([
                {"Accounts": ["111111111111", "222222222222"], "Regions": ["us-east-1"]},
                {
                    "Accounts": ["333333333333"],
                    "Regions": ["eu-west-1"],
                    "ParameterOverrides": [{"Replicas": 3}]
                }
            ])),
            None,
        );

        let output = resource.handle(&req).await.unwrap();
        assert_eq!(output.physical_resource_id, STACK_SET_ID);
        assert_eq!(output.data["StackSetId"], json!(STACK_SET_ID));
        assert_eq!(output.data["StackSetName"], json!("platform-Baseline"));

        let calls = resource.api().calls();
        assert_eq!(calls.len(), 3);

        let Call::CreateStackSet { name, definition } = &calls[0] else {
            panic!("expected CreateStackSet first, got {calls:?}");
        };
        assert_eq!(name, "platform-Baseline");
        assert_eq!(definition.template_url, "https://templates.s3.amazonaws.com/baseline.yaml");
        assert_eq!(definition.capabilities, vec!["CAPABILITY_NAMED_IAM"]);
        assert_eq!(definition.parameters[0].key, "Environment");
        assert_eq!(definition.parameters[0].value, "prod");
        assert_eq!(definition.tags[0].key, "Owner");

        let first = calls[1].instances().unwrap();
        assert_eq!(first.stack_set, STACK_SET_ID);
        assert_eq!(first.accounts, vec!["111111111111", "222222222222"]);
        assert_eq!(first.regions, vec!["us-east-1"]);
        assert!(first.parameter_overrides.is_empty());

        let second = calls[2].instances().unwrap();
        assert_eq!(second.accounts, vec!["333333333333"]);
        assert_eq!(second.parameter_overrides[0].key, "Replicas");
        assert_eq!(second.parameter_overrides[0].value, "3");
    }

    #[tokio::test]
    async fn test_should_use_explicit_name_and_description() {
        let resource = fake_resource();
        let mut props = properties(json!([]));
        props["StackSetName"] = json!("guardrails");
        props["StackSetDescription"] = json!("Org guardrails");
        props["AdministrationRoleARN"] = json!("arn:aws:iam::123456789012:role/Admin");

        let output = resource
            .handle(&event("Create", None, props, None))
            .await
            .unwrap();
        assert_eq!(output.physical_resource_id, "guardrails:0001");

        let calls = resource.api().calls();
        let Call::CreateStackSet { name, definition } = &calls[0] else {
            panic!("expected CreateStackSet, got {calls:?}");
        };
        assert_eq!(name, "guardrails");
        assert_eq!(definition.description, "Org guardrails");
        assert_eq!(
            definition.administration_role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/Admin")
        );
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn test_should_skip_blank_specs() {
        let resource = fake_resource();
        let req = event(
            "Create",
            None,
            properties(json!([{"Accounts": [""], "Regions": [""]}])),
            None,
        );

        resource.handle(&req).await.unwrap();
        assert_eq!(resource.api().calls_to("CreateStackInstances").len(), 0);
    }

    #[tokio::test]
    async fn test_should_reject_duplicates_before_any_call() {
        let resource = fake_resource();
        let req = event(
            "Create",
            None,
            properties(json!([
                {"Accounts": ["111111111111"], "Regions": ["us-east-1", "us-west-2"]},
                {"Accounts": ["111111111111"], "Regions": ["us-west-2"]}
            ])),
            None,
        );

        let err = resource.handle(&req).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "111111111111 / us-west-2 is defined multiple times"
        );
        assert!(resource.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_accounts_without_regions() {
        let resource = fake_resource();
        let req = event(
            "Create",
            None,
            properties(json!([{"Accounts": ["111111111111"], "Regions": []}])),
            None,
        );

        let err = resource.handle(&req).await.unwrap_err();
        assert!(matches!(err.source, StackSetError::MissingRegions));
        assert_eq!(
            err.to_string(),
            "You must specify at least one region with a list of accounts."
        );
    }

    #[tokio::test]
    async fn test_should_keep_stack_set_id_when_launch_exhausts_retries() {
        let resource = fake_resource();
        resource.api().fail_times(
            "CreateStackInstances",
            api_error!(OperationInProgressException),
            20,
        );
        let req = event(
            "Create",
            None,
            properties(json!([{"Accounts": ["111111111111"], "Regions": ["us-east-1"]}])),
            None,
        );

        let err = resource.handle(&req).await.unwrap_err();
        assert_eq!(err.physical_resource_id.as_deref(), Some(STACK_SET_ID));
        assert_eq!(err.to_string(), "Failed to launch stacks after 20 tries.");
        assert_eq!(resource.api().calls_to("CreateStackInstances").len(), 20);
    }

    #[tokio::test]
    async fn test_should_succeed_on_last_allowed_attempt() {
        let resource = fake_resource();
        resource.api().fail_times(
            "CreateStackInstances",
            api_error!(OperationInProgressException),
            19,
        );
        let req = event(
            "Create",
            None,
            properties(json!([{"Accounts": ["111111111111"], "Regions": ["us-east-1"]}])),
            None,
        );

        resource.handle(&req).await.unwrap();
        assert_eq!(resource.api().calls_to("CreateStackInstances").len(), 20);
    }
}
