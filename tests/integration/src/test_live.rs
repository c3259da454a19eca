//! Lifecycle tests against real CloudFormation.

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result};
    use serde_json::json;
    use stackset_core::{CloudFormationStackSets, ResourceConfig, RetryPolicy, StackSetResource};

    use crate::{event, init_tracing};

    fn required(name: &str) -> Result<String> {
        std::env::var(name).with_context(|| format!("{name} must be set"))
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_should_create_and_delete_stack_set() -> Result<()> {
        init_tracing();
        let template_url = required("STACKSET_TEST_TEMPLATE_URL")?;
        let account = required("STACKSET_TEST_ACCOUNT")?;

        let config = ResourceConfig::from_env();
        let api = CloudFormationStackSets::from_config(&config).await;
        let resource = StackSetResource::new(api, RetryPolicy::default());

        let props = json!({
            "StackSetName": format!("stackset-it-{}", std::process::id()),
            "TemplateURL": template_url,
            "StackInstances": [{"Accounts": [account], "Regions": [config.region.clone()]}],
        });

        let created = resource
            .handle(&event("Create", None, props.clone(), None))
            .await?;
        assert!(created.data.contains_key("StackSetId"));

        resource
            .handle(&event(
                "Delete",
                Some(&created.physical_resource_id),
                props,
                None,
            ))
            .await?;
        Ok(())
    }
}
