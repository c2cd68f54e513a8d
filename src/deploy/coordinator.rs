// ABOUTME: Coordinates log streaming and readiness polling for one submitted deployment.
// ABOUTME: Both tasks share a cancellation token that is cancelled exactly once on return.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::client::PipelineClient;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::types::{ActionId, PipelineName};

use super::outcome::{WaitOutcome, WaitState};
use super::readiness::ReadinessPoller;
use super::stream::{LogSink, ProgressStreamer};
use super::DeployError;

/// Runs the progress streamer and readiness poller side by side.
///
/// Each call to [`wait`](Self::wait) derives a fresh token from the parent
/// token and hands it to both tasks. The token is cancelled on every exit
/// path, including success, so neither task outlives the call. On interrupt
/// the coordinator returns without waiting for the tasks to acknowledge.
pub struct WaitCoordinator<C: ?Sized> {
    client: Arc<C>,
    sink: Arc<dyn LogSink>,
    poll_interval: Duration,
    parent: CancellationToken,
}

impl<C> WaitCoordinator<C>
where
    C: PipelineClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            client,
            sink,
            poll_interval: DEFAULT_POLL_INTERVAL,
            parent: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Scope the shared token under `parent`; cancelling it stops any wait.
    pub fn with_parent(mut self, parent: CancellationToken) -> Self {
        self.parent = parent;
        self
    }

    /// Wait for `action` of deployment `name` to finish and its resources to run.
    pub async fn wait(
        &self,
        name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
        interrupt: &CancellationToken,
    ) -> WaitOutcome {
        let mut state = WaitState::Starting;
        tracing::debug!("wait for '{}' is {}", name, state);

        if interrupt.is_cancelled() {
            return WaitOutcome::Interrupted;
        }

        let shared = self.parent.child_token();
        // Cancels both tasks when this scope exits, whichever path returns.
        let _cancel_on_exit = shared.clone().drop_guard();

        self.spawn_streamer(name, action, &shared);
        let poller = self.spawn_poller(name, action, timeout, &shared);

        state = transition(name, state, WaitState::Waiting);

        let outcome = tokio::select! {
            biased;

            () = interrupt.cancelled() => {
                tracing::info!("interrupt received, stopping wait for '{}'", name);
                WaitOutcome::Interrupted
            }
            joined = poller => match joined {
                Ok(Ok(())) => WaitOutcome::Succeeded,
                Ok(Err(e)) => WaitOutcome::from_error(e),
                Err(e) => WaitOutcome::Failed(DeployError::Task(e.to_string())),
            },
        };

        transition(name, state, outcome.state());
        outcome
    }

    fn spawn_streamer(&self, name: &PipelineName, action: &ActionId, shared: &CancellationToken) {
        let streamer = ProgressStreamer::new(Arc::clone(&self.client), Arc::clone(&self.sink));
        let name = name.clone();
        let action = action.clone();
        let cancel = shared.clone();

        tokio::spawn(async move {
            if let Err(e) = streamer.run(&name, &action, &cancel).await {
                tracing::warn!("there was an error streaming pipeline logs: {}", e);
            }
        });
    }

    fn spawn_poller(
        &self,
        name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
        shared: &CancellationToken,
    ) -> tokio::task::JoinHandle<Result<(), DeployError>> {
        let poller =
            ReadinessPoller::new(Arc::clone(&self.client)).with_interval(self.poll_interval);
        let name = name.clone();
        let action = action.clone();
        let cancel = shared.clone();

        tokio::spawn(async move { poller.run(&name, &action, timeout, &cancel).await })
    }
}

fn transition(name: &PipelineName, from: WaitState, to: WaitState) -> WaitState {
    tracing::debug!("wait for '{}': {} -> {}", name, from, to);
    to
}
