// ABOUTME: Control-plane client abstraction used by the deploy orchestration.
// ABOUTME: Defines the PipelineClient trait, its wire types, and the HTTP implementation.

mod error;
mod http;
mod status;

pub use error::{ClientError, TransportError};
pub use http::HttpClient;
pub use status::{
    ERROR_STATUS, ResourceStatus, ResourceStatusSnapshot, StatusKind, TRANSITIONAL_STATUSES,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;

use crate::types::{ActionId, PipelineName};

/// Operations the control plane offers for pipeline deployments.
///
/// Implementations are shared between concurrently running tasks behind an
/// `Arc`, so every method takes `&self`.
#[async_trait]
pub trait PipelineClient: Send + Sync {
    /// Request a deployment. Returns the action tracking it.
    async fn deploy(&self, spec: &DeploySpec) -> Result<Action, ClientError>;

    /// Open the log stream of an action.
    async fn stream_logs(
        &self,
        name: &PipelineName,
        action: &ActionId,
    ) -> Result<LogLineStream, ClientError>;

    /// Block until the action leaves its running state or `timeout` elapses.
    async fn wait_for_action(
        &self,
        name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
    ) -> Result<(), ClientError>;

    /// Current status of every resource of a pipeline.
    async fn resource_status(
        &self,
        name: &PipelineName,
    ) -> Result<ResourceStatusSnapshot, ClientError>;

    /// Whether a pipeline with this name is already deployed.
    async fn exists(&self, name: &PipelineName) -> Result<bool, ClientError>;
}

/// Log entries of an action, ending when the remote stream closes.
pub type LogLineStream = Pin<Box<dyn Stream<Item = Result<LogLine, ClientError>> + Send>>;

/// A parsed `KEY=VALUE` pipeline variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

/// What gets sent to the control plane to start a deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeploySpec {
    #[serde(serialize_with = "serialize_name")]
    pub name: PipelineName,
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(rename = "filename", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub variables: Vec<Variable>,
}

fn serialize_name<S: serde::Serializer>(name: &PipelineName, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(name.as_str())
}

/// A deployment execution on the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Action {
    pub name: ActionId,
    #[serde(default)]
    pub status: String,
}

/// One log entry of an action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogLine {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
}

impl LogLine {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            message: message.into(),
        }
    }
}
