// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted in-memory control plane and a collecting log sink.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use pipedeploy::client::{
    Action, ClientError, DeploySpec, LogLine, LogLineStream, PipelineClient,
    ResourceStatusSnapshot,
};
use pipedeploy::deploy::LogSink;
use pipedeploy::types::{ActionId, PipelineName};
use std::collections::VecDeque;
use std::sync::{Arc, Once};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("pipedeploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One scripted answer to a resource status poll.
#[derive(Debug, Clone)]
pub enum Poll {
    Snapshot(ResourceStatusSnapshot),
    Fail(String),
}

#[allow(dead_code)]
pub fn snapshot(entries: &[(&str, &str)]) -> Poll {
    Poll::Snapshot(entries.iter().copied().collect())
}

#[allow(dead_code)]
pub fn remote(message: &str, image: Option<&str>) -> ClientError {
    ClientError::Remote {
        status: 500,
        message: message.to_string(),
        image: image.map(str::to_string),
    }
}

/// In-memory control plane with scripted behavior.
///
/// Status polls consume the script in order; the last entry repeats.
#[derive(Default)]
pub struct FakeClient {
    deploy_delay: Option<Duration>,
    deploy_error: Option<String>,
    action_delay: Option<Duration>,
    action_error: Option<(String, Option<String>)>,
    log_lines: Vec<String>,
    log_error: Option<String>,
    hang_logs: bool,
    hang_status: bool,
    exists: bool,
    exists_delay: Option<Duration>,
    polls: Mutex<VecDeque<Poll>>,
    deploys: Mutex<Vec<DeploySpec>>,
    status_calls: Mutex<usize>,
    open_streams: Arc<()>,
}

#[allow(dead_code)]
impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polls(self, polls: Vec<Poll>) -> Self {
        *self.polls.lock() = polls.into();
        self
    }

    pub fn with_deploy_delay(mut self, delay: Duration) -> Self {
        self.deploy_delay = Some(delay);
        self
    }

    pub fn with_deploy_error(mut self, message: &str) -> Self {
        self.deploy_error = Some(message.to_string());
        self
    }

    pub fn with_action_delay(mut self, delay: Duration) -> Self {
        self.action_delay = Some(delay);
        self
    }

    pub fn with_action_error(mut self, message: &str, image: Option<&str>) -> Self {
        self.action_error = Some((message.to_string(), image.map(str::to_string)));
        self
    }

    pub fn with_logs(mut self, lines: &[&str]) -> Self {
        self.log_lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_log_error(mut self, message: &str) -> Self {
        self.log_error = Some(message.to_string());
        self
    }

    /// Keep log streams open after the scripted lines.
    pub fn hang_logs(mut self) -> Self {
        self.hang_logs = true;
        self
    }

    /// Accept status polls and never answer them.
    pub fn hang_status(mut self) -> Self {
        self.hang_status = true;
        self
    }

    pub fn with_exists_delay(mut self, delay: Duration) -> Self {
        self.exists_delay = Some(delay);
        self
    }

    pub fn existing(mut self) -> Self {
        self.exists = true;
        self
    }

    pub fn deploys(&self) -> Vec<DeploySpec> {
        self.deploys.lock().clone()
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock()
    }

    /// Log streams handed out and not yet dropped.
    pub fn open_streams(&self) -> usize {
        Arc::strong_count(&self.open_streams) - 1
    }

    fn next_poll(&self) -> Poll {
        let mut polls = self.polls.lock();
        if polls.len() > 1 {
            polls.pop_front().unwrap()
        } else {
            polls
                .front()
                .cloned()
                .unwrap_or_else(|| Poll::Snapshot(ResourceStatusSnapshot::default()))
        }
    }
}

#[async_trait]
impl PipelineClient for FakeClient {
    async fn deploy(&self, spec: &DeploySpec) -> Result<Action, ClientError> {
        self.deploys.lock().push(spec.clone());
        if let Some(delay) = self.deploy_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.deploy_error {
            return Err(remote(message, None));
        }
        Ok(Action {
            name: ActionId::new(format!("{}-action-1", spec.name)),
            status: "pending".to_string(),
        })
    }

    async fn stream_logs(
        &self,
        _name: &PipelineName,
        _action: &ActionId,
    ) -> Result<LogLineStream, ClientError> {
        let mut items: Vec<Result<LogLine, ClientError>> =
            self.log_lines.iter().map(|l| Ok(LogLine::new(l.clone()))).collect();
        if let Some(message) = &self.log_error {
            items.push(Err(remote(message, None)));
        }

        let guard = Arc::clone(&self.open_streams);
        let lines = futures::stream::iter(items);
        let stream = if self.hang_logs {
            lines.chain(futures::stream::pending()).boxed()
        } else {
            lines.boxed()
        };

        Ok(Box::pin(stream.map(move |item| {
            let _held = &guard;
            item
        })))
    }

    async fn wait_for_action(
        &self,
        _name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
    ) -> Result<(), ClientError> {
        if let Some(delay) = self.action_delay {
            match timeout {
                Some(limit) if limit < delay => {
                    tokio::time::sleep(limit).await;
                    return Err(ClientError::ActionTimeout {
                        action: action.to_string(),
                        timeout: limit.into(),
                    });
                }
                _ => tokio::time::sleep(delay).await,
            }
        }
        match &self.action_error {
            Some((message, image)) => Err(remote(message, image.as_deref())),
            None => Ok(()),
        }
    }

    async fn resource_status(
        &self,
        _name: &PipelineName,
    ) -> Result<ResourceStatusSnapshot, ClientError> {
        *self.status_calls.lock() += 1;
        if self.hang_status {
            return std::future::pending().await;
        }
        match self.next_poll() {
            Poll::Snapshot(snapshot) => Ok(snapshot),
            Poll::Fail(message) => Err(remote(&message, None)),
        }
    }

    async fn exists(&self, _name: &PipelineName) -> Result<bool, ClientError> {
        if let Some(delay) = self.exists_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.exists)
    }
}

/// Log sink that keeps every message it receives.
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LogSink for CollectingSink {
    fn emit(&self, line: &LogLine) {
        self.lines.lock().push(line.message.clone());
    }
}
