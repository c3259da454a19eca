//! Update event integration tests.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stackset_core::testing::Call;
    use stackset_model::api_error;

    use crate::{STACK_SET_ID, event, fake_resource, properties};

    #[tokio::test]
    async fn test_should_add_remove_and_update_instances() {
        let resource = fake_resource();
        let old = properties(json!([
            {"Accounts": ["111111111111", "222222222222"], "Regions": ["us-east-1", "us-west-2"]}
        ]));
        let new = properties(json!([
            {
                "Accounts": ["111111111111"],
                "Regions": ["us-east-1", "us-west-2"],
                "ParameterOverrides": [{"Channel": "canary"}]
            },
            {"Accounts": ["333333333333"], "Regions": ["us-east-1"]}
        ]));

        let output = resource
            .handle(&event("Update", Some(STACK_SET_ID), new, Some(old)))
            .await
            .unwrap();
        assert_eq!(output.physical_resource_id, STACK_SET_ID);

        let calls = resource.api().calls();
        let operations: Vec<_> = calls.iter().map(Call::operation).collect();
        assert_eq!(
            operations,
            vec!["CreateStackInstances", "DeleteStackInstances", "UpdateStackInstances"]
        );

        let added = calls[0].instances().unwrap();
        assert_eq!(added.accounts, vec!["333333333333"]);
        assert_eq!(added.regions, vec!["us-east-1"]);

        let removed = calls[1].instances().unwrap();
        assert_eq!(removed.accounts, vec!["222222222222"]);
        assert_eq!(removed.regions, vec!["us-east-1", "us-west-2"]);

        let changed = calls[2].instances().unwrap();
        assert_eq!(changed.stack_set, "platform-Baseline");
        assert_eq!(changed.accounts, vec!["111111111111"]);
        assert_eq!(changed.regions, vec!["us-east-1", "us-west-2"]);
        assert_eq!(changed.parameter_overrides[0].value, "canary");
    }

    #[tokio::test]
    async fn test_should_do_nothing_when_nothing_changed() {
        let resource = fake_resource();
        let props = properties(json!([
            {"Accounts": ["111111111111"], "Regions": ["us-east-1"]}
        ]));

        resource
            .handle(&event("Update", Some(STACK_SET_ID), props.clone(), Some(props)))
            .await
            .unwrap();
        assert!(resource.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_update_stack_set_when_template_changes() {
        let resource = fake_resource();
        let old = properties(json!([]));
        let mut new = old.clone();
        new["TemplateURL"] = json!("https://templates.s3.amazonaws.com/baseline-v2.yaml");
        new["OperationPreferences"] = json!({"MaxConcurrentCount": "2"});

        resource
            .handle(&event("Update", Some(STACK_SET_ID), new, Some(old)))
            .await
            .unwrap();

        let calls = resource.api().calls();
        let Call::UpdateStackSet {
            stack_set,
            definition,
            preferences,
        } = &calls[0]
        else {
            panic!("expected UpdateStackSet, got {calls:?}");
        };
        assert_eq!(stack_set, STACK_SET_ID);
        assert_eq!(
            definition.template_url,
            "https://templates.s3.amazonaws.com/baseline-v2.yaml"
        );
        assert_eq!(
            definition.description,
            "This StackSet belongs to the CloudFormation stack platform."
        );
        assert_eq!(preferences.max_concurrent_count, Some(2));
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn test_should_fail_when_template_url_missing_everywhere() {
        let resource = fake_resource();
        let new = json!({"Tags": [{"Owner": "security"}]});

        let err = resource
            .handle(&event("Update", Some(STACK_SET_ID), new, Some(json!({}))))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "TemplateURL not found during update event");
        assert!(resource.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_fail_when_stack_set_update_stays_in_progress() {
        let resource = fake_resource();
        resource.api().fail_times(
            "UpdateStackSet",
            api_error!(OperationInProgressException),
            20,
        );
        let old = properties(json!([]));
        let mut new = old.clone();
        new["Parameters"] = json!([{"Environment": "staging"}]);

        let err = resource
            .handle(&event("Update", Some(STACK_SET_ID), new, Some(old)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to update stack set after 20 tries.");
        assert_eq!(resource.api().calls().len(), 20);
    }

    #[tokio::test]
    async fn test_should_continue_when_instance_removal_fails() {
        let resource = fake_resource();
        resource.api().fail_next(
            "DeleteStackInstances",
            api_error!(StackSetNotFoundException, "gone"),
        );
        let old = properties(json!([
            {"Accounts": ["111111111111", "222222222222"], "Regions": ["us-east-1"]}
        ]));
        let new = properties(json!([
            {"Accounts": ["111111111111"], "Regions": ["us-east-1"]}
        ]));

        resource
            .handle(&event("Update", Some(STACK_SET_ID), new, Some(old)))
            .await
            .unwrap();
        assert_eq!(resource.api().calls_to("DeleteStackInstances").len(), 1);
    }

    #[tokio::test]
    async fn test_should_reject_duplicates_in_new_properties() {
        let resource = fake_resource();
        let new = properties(json!([
            {"Accounts": ["111111111111"], "Regions": ["us-east-1"]},
            {"Accounts": ["111111111111"], "Regions": ["us-east-1"]}
        ]));

        let err = resource
            .handle(&event("Update", Some(STACK_SET_ID), new, Some(properties(json!([])))))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "111111111111 / us-east-1 is defined multiple times"
        );
        assert!(resource.api().calls().is_empty());
    }
}
