// ABOUTME: Error types for submitting and waiting on pipeline deployments.
// ABOUTME: Remote failures are kept verbatim and only classified on request.

use crate::client::ClientError;
use crate::registry::{self, ErrorClassification};

/// Errors that can occur while deploying a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A `--var` entry without `=`.
    #[error("invalid variable value '{0}': must follow KEY=VALUE format")]
    InvalidVariable(String),

    /// The request is missing a required field.
    #[error("invalid deployment request: {0}")]
    InvalidRequest(String),

    /// The user interrupted the operation.
    #[error("interrupted by user")]
    Interrupted,

    /// The control plane rejected or failed the deploy call.
    #[error("failed to deploy '{name}': {source}")]
    Submission { name: String, source: ClientError },

    /// Checking for an existing deployment failed.
    #[error("failed to check whether '{name}' is deployed: {source}")]
    Lookup { name: String, source: ClientError },

    /// The deployment action finished with an error.
    #[error("'{name}' deploy failed: {source}")]
    ActionFailed { name: String, source: ClientError },

    /// A resource status poll failed.
    #[error("failed to get resource status of '{name}': {source}")]
    Status { name: String, source: ClientError },

    /// The deployment did not settle in time.
    #[error("'{name}' deploy didn't finish after {timeout}")]
    Timeout {
        name: String,
        timeout: humantime::Duration,
    },

    /// At least one resource reported the error status.
    #[error("repository '{name}' deployed with errors")]
    DeployedWithErrors { name: String },

    /// The wait was cancelled by its parent scope.
    #[error("wait cancelled")]
    Cancelled,

    /// A background task panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Rejected locally before any network call.
    Validation,
    /// User interrupt or parent cancellation.
    Interrupted,
    /// The deploy request itself failed.
    Submission,
    /// The deployment ran but did not become healthy.
    Readiness,
    /// The deployment did not settle in time.
    Timeout,
    /// Task failure inside the orchestration.
    Internal,
}

impl DeployError {
    pub(crate) fn timeout(name: impl ToString, timeout: std::time::Duration) -> Self {
        DeployError::Timeout {
            name: name.to_string(),
            timeout: timeout.into(),
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::InvalidVariable(_) | DeployError::InvalidRequest(_) => {
                DeployErrorKind::Validation
            }
            DeployError::Interrupted | DeployError::Cancelled => DeployErrorKind::Interrupted,
            DeployError::Submission { .. } | DeployError::Lookup { .. } => {
                DeployErrorKind::Submission
            }
            DeployError::ActionFailed { .. }
            | DeployError::Status { .. }
            | DeployError::DeployedWithErrors { .. } => DeployErrorKind::Readiness,
            DeployError::Timeout { .. } => DeployErrorKind::Timeout,
            DeployError::Task(_) => DeployErrorKind::Internal,
        }
    }

    /// The control-plane error behind this failure, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            DeployError::Submission { source, .. }
            | DeployError::Lookup { source, .. }
            | DeployError::ActionFailed { source, .. }
            | DeployError::Status { source, .. } => Some(source),
            _ => None,
        }
    }

    /// User-facing classification of a remote build/push failure.
    ///
    /// Only errors the control plane attributes to an image are classified;
    /// everything else is presented as-is.
    pub fn classification(&self) -> Option<ErrorClassification> {
        match self.client_error()? {
            ClientError::Remote {
                message,
                image: Some(image),
                ..
            } => Some(registry::classify(message, image)),
            _ => None,
        }
    }

    /// Whether the underlying remote failure looks retryable.
    pub fn is_transient(&self) -> bool {
        self.client_error().is_some_and(ClientError::is_transient)
    }
}
