// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Submission moves a request to the submitted state, which alone can be waited on.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::client::PipelineClient;
use crate::types::{ActionId, PipelineName};

use super::coordinator::WaitCoordinator;
use super::outcome::WaitOutcome;
use super::state::{Requested, Submitted};
use super::submit::submit_request;
use super::{DeployError, DeploymentRequest};

/// A deployment in progress, parameterized by its current state.
///
/// Only a `Deployment<Submitted>` holds an action handle, so waiting on a
/// deployment that was never accepted does not compile.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) request: DeploymentRequest,
    pub(crate) state: S,
}

impl Deployment<Requested> {
    pub fn new(request: DeploymentRequest) -> Self {
        Deployment {
            request,
            state: Requested,
        }
    }

    /// Whether a pipeline with this name is already deployed.
    ///
    /// Returns [`DeployError::Interrupted`] when `interrupt` fires before the
    /// lookup answers.
    pub async fn already_exists<C>(
        &self,
        client: &C,
        interrupt: &CancellationToken,
    ) -> Result<bool, DeployError>
    where
        C: PipelineClient + ?Sized,
    {
        let found = tokio::select! {
            biased;

            () = interrupt.cancelled() => return Err(DeployError::Interrupted),
            found = client.exists(self.name()) => found,
        };

        found.map_err(|source| DeployError::Lookup {
            name: self.name().to_string(),
            source,
        })
    }

    /// Send the request to the control plane.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidVariable`] without any network call when
    /// a variable is malformed, and [`DeployError::Interrupted`] when
    /// `interrupt` fires before the control plane answers.
    pub async fn submit<C>(
        self,
        client: &Arc<C>,
        interrupt: &CancellationToken,
    ) -> Result<Deployment<Submitted>, DeployError>
    where
        C: PipelineClient + ?Sized + 'static,
    {
        let action = submit_request(client, &self.request, interrupt).await?;

        Ok(Deployment {
            request: self.request,
            state: Submitted { action },
        })
    }
}

impl<S> Deployment<S> {
    pub fn name(&self) -> &PipelineName {
        self.request.name()
    }

    pub fn request(&self) -> &DeploymentRequest {
        &self.request
    }
}

impl Deployment<Submitted> {
    pub fn action(&self) -> &ActionId {
        self.state.action()
    }

    /// Stream progress and wait until every resource runs.
    pub async fn wait<C>(
        &self,
        coordinator: &WaitCoordinator<C>,
        timeout: Option<Duration>,
        interrupt: &CancellationToken,
    ) -> WaitOutcome
    where
        C: PipelineClient + ?Sized + 'static,
    {
        coordinator
            .wait(self.name(), self.action(), timeout, interrupt)
            .await
    }
}
