//! Per-event routing: run the lifecycle handler within the Lambda deadline and
//! turn its outcome into a custom resource response.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lambda_runtime::LambdaEvent;
use stackset_core::{EventProgress, HandlerFailure, StackSetApi, StackSetResource};
use stackset_model::{CustomResourceRequest, CustomResourceResponse, NO_PHYSICAL_ID};
use tracing::{Instrument, error, info, info_span};

use crate::responder::Responder;

/// Routes custom resource events to a [`StackSetResource`].
#[derive(Debug)]
pub struct Dispatcher<A> {
    resource: Result<StackSetResource<A>, String>,
    responder: Responder,
    timeout_margin: Duration,
}

impl<A: StackSetApi> Dispatcher<A> {
    /// Create a dispatcher. A failed initialization is kept and reported on
    /// every event.
    pub fn new(
        resource: Result<StackSetResource<A>, String>,
        responder: Responder,
        timeout_margin: Duration,
    ) -> Self {
        Self {
            resource,
            responder,
            timeout_margin,
        }
    }

    /// Lambda entry point for one event.
    pub async fn handle(
        &self,
        event: LambdaEvent<CustomResourceRequest>,
    ) -> Result<(), lambda_runtime::Error> {
        let LambdaEvent {
            payload: request,
            context,
        } = event;
        let span = info_span!(
            "custom_resource",
            request_id = %request.request_id,
            request_type = %request.request_type,
            logical_resource_id = %request.logical_resource_id,
        );

        async {
            info!(
                lambda_request_id = %context.request_id,
                physical_resource_id = ?request.physical_resource_id,
                "received event"
            );
            let budget = time_budget(context.deadline, self.timeout_margin, SystemTime::now());
            let response = self
                .process(&request, budget, &context.env_config.log_stream)
                .await;
            self.responder
                .send(&request.response_url, &response)
                .await?;
            Ok::<(), lambda_runtime::Error>(())
        }
        .instrument(span)
        .await
    }

    /// Run the handler for `request`, giving up after `budget`.
    pub async fn process(
        &self,
        request: &CustomResourceRequest,
        budget: Duration,
        log_stream: &str,
    ) -> CustomResourceResponse {
        let resource = match &self.resource {
            Ok(resource) => resource,
            Err(reason) => {
                error!(%reason, "initialization failed");
                return failed(request, None, format!("Initialization failed: {reason}"));
            }
        };

        let progress = EventProgress::default();
        match tokio::time::timeout(budget, resource.handle_tracked(request, &progress)).await {
            Ok(Ok(output)) => {
                info!(physical_resource_id = %output.physical_resource_id, "event handled");
                CustomResourceResponse::success(
                    request,
                    output.physical_resource_id,
                    output.data,
                    logs_hint(log_stream),
                )
            }
            Ok(Err(HandlerFailure {
                physical_resource_id,
                source,
            })) => {
                error!(error = %source, "event failed");
                failed(request, physical_resource_id, source.to_string())
            }
            Err(_) => {
                let created = progress.created_stack_set().map(ToOwned::to_owned);
                error!(
                    budget_secs = budget.as_secs(),
                    created_stack_set = ?created,
                    "handler timed out"
                );
                failed(
                    request,
                    created,
                    format!("Timed out before the Lambda deadline. {}", logs_hint(log_stream)),
                )
            }
        }
    }
}

fn logs_hint(log_stream: &str) -> String {
    format!("See the details in CloudWatch Log Stream: {log_stream}")
}

/// FAILED response; the physical id falls back to the request's, then `NONE`.
fn failed(
    request: &CustomResourceRequest,
    physical_resource_id: Option<String>,
    reason: String,
) -> CustomResourceResponse {
    let physical_resource_id = physical_resource_id
        .or_else(|| request.physical_resource_id.clone())
        .unwrap_or_else(|| NO_PHYSICAL_ID.to_owned());
    CustomResourceResponse::failed(request, physical_resource_id, reason)
}

/// Time left before `deadline_ms` (epoch milliseconds) minus `margin`.
fn time_budget(deadline_ms: u64, margin: Duration, now: SystemTime) -> Duration {
    let deadline = UNIX_EPOCH + Duration::from_millis(deadline_ms);
    deadline
        .duration_since(now)
        .unwrap_or_default()
        .saturating_sub(margin)
}
