//! StackSet custom resource - Lambda bootstrap.
//!
//! Receives `Custom::StackSet` events from CloudFormation, applies them to the
//! StackSet, and reports the outcome to the event's `ResponseURL`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AWS_REGION` | `us-east-1` | Region the StackSet lives in |
//! | `STACKSET_RETRY_ATTEMPTS` | `20` | Calls made while an operation is in progress |
//! | `STACKSET_RETRY_DELAY_SECS` | `15` | Delay between those calls |
//! | `STACKSET_TIMEOUT_MARGIN_SECS` | `5` | Time kept before the Lambda deadline to report a timeout |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod dispatch;
mod responder;

use anyhow::{Context, Result, ensure};
use lambda_runtime::{LambdaEvent, service_fn};
use stackset_core::{CloudFormationStackSets, ResourceConfig, StackSetResource};
use stackset_model::CustomResourceRequest;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::dispatch::Dispatcher;
use crate::responder::Responder;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// Output is JSON without ANSI colors so CloudWatch can index it.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_current_span(true)
        .with_ansi(false)
        .init();

    Ok(())
}

/// Build the StackSet resource for the configured region.
async fn init_resource(
    config: &ResourceConfig,
) -> Result<StackSetResource<CloudFormationStackSets>> {
    ensure!(!config.region.trim().is_empty(), "AWS_REGION is empty");
    let api = CloudFormationStackSets::from_config(config).await;
    Ok(StackSetResource::new(api, config.retry_policy()))
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let config = ResourceConfig::from_env();
    if let Err(e) = init_tracing(&config.log_level) {
        init_tracing("info")?;
        warn!(error = %e, "falling back to the info log level");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        region = %config.region,
        retry_attempts = config.retry_attempts,
        retry_delay_secs = config.retry_delay_secs,
        "starting stackset custom resource"
    );

    let resource = init_resource(&config).await.map_err(|e| {
        error!(error = %e, "initialization failed, every event will be answered FAILED");
        format!("{e:#}")
    });
    let dispatcher = Dispatcher::new(resource, Responder::new()?, config.timeout_margin());

    let dispatcher = &dispatcher;
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<CustomResourceRequest>| dispatcher.handle(event),
    ))
    .await
}
