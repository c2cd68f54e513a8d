// ABOUTME: Submission of a deployment request as an interruptible unit of work.
// ABOUTME: Validates variables locally, then races the remote call against the interrupt token.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::PipelineClient;
use crate::types::ActionId;

use super::{DeployError, DeploymentRequest};

/// Submit `request` and return the action handle assigned by the control plane.
///
/// Malformed variables fail before anything is sent. The remote call runs on
/// its own task; if `interrupt` fires first, this returns
/// [`DeployError::Interrupted`] right away and the call is left to finish on
/// its own. Remote errors are returned unclassified.
pub async fn submit_request<C>(
    client: &Arc<C>,
    request: &DeploymentRequest,
    interrupt: &CancellationToken,
) -> Result<ActionId, DeployError>
where
    C: PipelineClient + ?Sized + 'static,
{
    let spec = request.to_spec()?;

    if interrupt.is_cancelled() {
        return Err(DeployError::Interrupted);
    }

    tracing::info!(
        "deploy pipeline {} defined on file='{}' repository={} branch={} on namespace={}",
        spec.name,
        spec.file.as_deref().unwrap_or_default(),
        spec.repository,
        spec.branch.as_deref().unwrap_or_default(),
        request.namespace()
    );

    let name = spec.name.to_string();
    let client = Arc::clone(client);
    let call = tokio::spawn(async move { client.deploy(&spec).await });

    tokio::select! {
        biased;

        () = interrupt.cancelled() => {
            tracing::info!("interrupt received, abandoning submission of '{}'", name);
            Err(DeployError::Interrupted)
        }
        joined = call => match joined {
            Ok(Ok(action)) => {
                tracing::debug!("'{}' accepted as action {}", name, action.name);
                Ok(action.name)
            }
            Ok(Err(source)) => {
                tracing::info!("submission of '{}' failed: {}", name, source);
                Err(DeployError::Submission { name, source })
            }
            Err(e) => Err(DeployError::Task(e.to_string())),
        },
    }
}
