// ABOUTME: Application-wide error types for pipedeploy.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

use crate::client::ClientError;
use crate::deploy::DeployError;
use crate::types::PipelineNameError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid pipeline name: {0}")]
    InvalidName(#[from] PipelineNameError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type Result<T> = std::result::Result<T, Error>;
