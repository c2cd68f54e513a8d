// ABOUTME: Live progress streaming of a deployment action's log lines.
// ABOUTME: Forwards lines to a sink until the stream ends or the shared token fires.

use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientError, LogLine, PipelineClient};
use crate::types::{ActionId, PipelineName};

/// Destination for streamed log lines.
pub trait LogSink: Send + Sync {
    fn emit(&self, line: &LogLine);
}

/// Errors that end a progress stream early.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to open log stream: {0}")]
    Open(#[source] ClientError),

    #[error("failed to read log stream: {0}")]
    Read(#[source] ClientError),
}

/// Forwards an action's log lines to a [`LogSink`].
pub struct ProgressStreamer<C: ?Sized> {
    client: Arc<C>,
    sink: Arc<dyn LogSink>,
}

impl<C> ProgressStreamer<C>
where
    C: PipelineClient + ?Sized,
{
    pub fn new(client: Arc<C>, sink: Arc<dyn LogSink>) -> Self {
        Self { client, sink }
    }

    /// Stream until the remote side closes the stream or `cancel` fires.
    ///
    /// Cancellation is a normal end and returns `Ok`. Lines are emitted in
    /// the order they arrive.
    pub async fn run(
        &self,
        name: &PipelineName,
        action: &ActionId,
        cancel: &CancellationToken,
    ) -> Result<(), StreamError> {
        let mut lines = tokio::select! {
            biased;

            () = cancel.cancelled() => return Ok(()),
            opened = self.client.stream_logs(name, action) => opened.map_err(StreamError::Open)?,
        };

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::debug!("log stream of {} cancelled", action);
                    return Ok(());
                }
                next = lines.next() => match next {
                    Some(Ok(line)) => self.sink.emit(&line),
                    Some(Err(e)) => return Err(StreamError::Read(e)),
                    None => {
                        tracing::debug!("log stream of {} ended", action);
                        return Ok(());
                    }
                },
            }
        }
    }
}
