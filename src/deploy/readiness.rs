// ABOUTME: Readiness polling for a submitted deployment.
// ABOUTME: Waits for the action to finish, then polls resource status until all are running.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::{ClientError, PipelineClient, ResourceStatusSnapshot, StatusKind};
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::types::{ActionId, PipelineName};

use super::DeployError;

/// Result of evaluating one status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// No resource is in a transitional status.
    AllRunning,
    /// At least one resource is still settling.
    Transitioning,
}

/// Evaluate a snapshot for deployment `name`.
///
/// Any resource in the error status fails the deployment no matter what the
/// others report. Statuses that are neither error nor transitional count as
/// settled.
pub fn evaluate(
    name: &PipelineName,
    snapshot: &ResourceStatusSnapshot,
) -> Result<Readiness, DeployError> {
    let mut readiness = Readiness::AllRunning;

    for (resource, status) in snapshot.iter() {
        tracing::debug!("Resource {} is {}", resource, status);
        match status.kind() {
            StatusKind::Error => {
                return Err(DeployError::DeployedWithErrors {
                    name: name.to_string(),
                });
            }
            StatusKind::Transitioning => readiness = Readiness::Transitioning,
            StatusKind::Stable => {}
        }
    }

    Ok(readiness)
}

/// Polls the control plane until a deployment is running.
pub struct ReadinessPoller<C: ?Sized> {
    client: Arc<C>,
    interval: Duration,
}

impl<C> ReadinessPoller<C>
where
    C: PipelineClient + ?Sized,
{
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Time between two resource status polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Wait for the deployment action, then for every resource to run.
    ///
    /// `timeout` applies to each of the two phases; `None` waits forever.
    pub async fn run(
        &self,
        name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        tokio::select! {
            biased;

            () = cancel.cancelled() => return Err(DeployError::Cancelled),
            finished = self.wait_for_action(name, action, timeout) => finished?,
        }

        tracing::debug!("Waiting for containers of '{}' to be healthy", name);
        self.wait_until_running(name, timeout, cancel).await
    }

    /// Wait for the deployment action to leave its running state.
    pub async fn wait_for_action(
        &self,
        name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
    ) -> Result<(), DeployError> {
        self.client
            .wait_for_action(name, action, timeout)
            .await
            .map_err(|source| match source {
                ClientError::ActionTimeout { timeout, .. } => DeployError::Timeout {
                    name: name.to_string(),
                    timeout,
                },
                source => DeployError::ActionFailed {
                    name: name.to_string(),
                    source,
                },
            })
    }

    /// Poll resource status every interval until all resources run, one
    /// fails, a poll errors, `timeout` elapses, or `cancel` fires.
    pub async fn wait_until_running(
        &self,
        name: &PipelineName,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = deadline(timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => return Err(DeployError::Cancelled),
                limit = &mut deadline => return Err(DeployError::timeout(name, limit)),
                _ = ticker.tick() => {
                    let snapshot = tokio::select! {
                        biased;

                        () = cancel.cancelled() => return Err(DeployError::Cancelled),
                        limit = &mut deadline => return Err(DeployError::timeout(name, limit)),
                        polled =self.client.resource_status(name) => {
                            polled.map_err(|source| DeployError::Status {
                                name: name.to_string(),
                                source,
                            })?
                        }
                    };

                    if evaluate(name, &snapshot)? == Readiness::AllRunning {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Resolves with the configured limit once it elapses; never resolves
/// without one.
async fn deadline(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(limit) => {
            tokio::time::sleep(limit).await;
            limit
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name() -> PipelineName {
        PipelineName::new("movies").unwrap()
    }

    #[test]
    fn pending_resource_keeps_waiting() {
        let snapshot: ResourceStatusSnapshot =
            [("svc-a", "running"), ("svc-b", "pending")].into_iter().collect();
        assert_eq!(
            evaluate(&name(), &snapshot).unwrap(),
            Readiness::Transitioning
        );
    }

    #[test]
    fn error_resource_fails_naming_deployment() {
        let snapshot: ResourceStatusSnapshot =
            [("svc-a", "running"), ("svc-b", "error")].into_iter().collect();
        let err = evaluate(&name(), &snapshot).unwrap_err();
        assert_eq!(err.to_string(), "repository 'movies' deployed with errors");
    }

    #[test]
    fn error_wins_over_transitioning() {
        let snapshot: ResourceStatusSnapshot =
            [("a", "pending"), ("b", "building"), ("c", "error")].into_iter().collect();
        assert!(evaluate(&name(), &snapshot).is_err());
    }

    #[test]
    fn unknown_statuses_count_as_settled() {
        let snapshot: ResourceStatusSnapshot =
            [("a", "running"), ("b", "sleeping"), ("c", "completed")].into_iter().collect();
        assert_eq!(evaluate(&name(), &snapshot).unwrap(), Readiness::AllRunning);
    }

    #[test]
    fn empty_snapshot_is_running() {
        let snapshot = ResourceStatusSnapshot::default();
        assert_eq!(evaluate(&name(), &snapshot).unwrap(), Readiness::AllRunning);
    }
}
