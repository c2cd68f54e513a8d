// ABOUTME: Error types for control-plane client operations.
// ABOUTME: Transport failures use SNAFU context selectors; API failures are plain enums.

use snafu::Snafu;

use crate::registry;

/// Failures below the HTTP API: connecting, handshaking, moving bytes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("failed to connect to {addr}: {source}"))]
    Connect { addr: String, source: std::io::Error },

    #[snafu(display("HTTP handshake with {addr} failed: {source}"))]
    Handshake { addr: String, source: hyper::Error },

    #[snafu(display("failed to build request: {source}"))]
    BuildRequest { source: hyper::http::Error },

    #[snafu(display("request to {path} failed: {source}"))]
    Send { path: String, source: hyper::Error },

    #[snafu(display("failed to read response body: {source}"))]
    Body { source: hyper::Error },
}

/// Errors returned by a [`PipelineClient`](super::PipelineClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The control plane answered with an error. `image` names the artifact
    /// the failure refers to when the control plane reports one.
    #[error("{message}")]
    Remote {
        status: u16,
        message: String,
        image: Option<String>,
    },

    #[error("pipeline '{0}' not found")]
    NotFound(String),

    #[error("action '{action}' finished with errors")]
    ActionFailed { action: String },

    #[error("action '{action}' didn't finish after {timeout}")]
    ActionTimeout {
        action: String,
        timeout: humantime::Duration,
    },

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid response from control plane: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// Whether the failure looks like a retryable network condition.
    pub fn is_transient(&self) -> bool {
        registry::is_transient(&self.to_string())
    }
}
