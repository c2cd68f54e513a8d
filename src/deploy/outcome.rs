// ABOUTME: Terminal results of waiting on and running a deployment.
// ABOUTME: Maps outcomes to wait states and process exit codes.

use std::fmt;

use super::{DeployError, DeployErrorKind};

/// States the wait coordinator moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Starting,
    Waiting,
    Interrupted,
    Failed,
    Succeeded,
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitState::Starting => "starting",
            WaitState::Waiting => "waiting",
            WaitState::Interrupted => "interrupted",
            WaitState::Failed => "failed",
            WaitState::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

/// How a wait ended.
#[derive(Debug)]
pub enum WaitOutcome {
    Succeeded,
    Failed(DeployError),
    Interrupted,
    TimedOut(DeployError),
}

impl WaitOutcome {
    pub(crate) fn from_error(err: DeployError) -> Self {
        match err.kind() {
            DeployErrorKind::Interrupted => WaitOutcome::Interrupted,
            DeployErrorKind::Timeout => WaitOutcome::TimedOut(err),
            _ => WaitOutcome::Failed(err),
        }
    }

    /// The terminal coordinator state for this outcome.
    pub fn state(&self) -> WaitState {
        match self {
            WaitOutcome::Succeeded => WaitState::Succeeded,
            WaitOutcome::Failed(_) | WaitOutcome::TimedOut(_) => WaitState::Failed,
            WaitOutcome::Interrupted => WaitState::Interrupted,
        }
    }
}

/// Result of a whole deploy run, as reported to the user.
#[derive(Debug)]
pub enum DeployOutcome {
    /// Submitted and every resource is running.
    Deployed,
    /// Submitted without waiting.
    Scheduled,
    /// Already deployed and asked to skip.
    Skipped,
    Interrupted,
    Failed(DeployError),
    TimedOut(DeployError),
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DeployOutcome::Deployed | DeployOutcome::Scheduled | DeployOutcome::Skipped
        )
    }

    /// Process exit code: 124 for timeouts, 130 for interrupts.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployOutcome::Deployed | DeployOutcome::Scheduled | DeployOutcome::Skipped => 0,
            DeployOutcome::Failed(_) => 1,
            DeployOutcome::TimedOut(_) => 124,
            DeployOutcome::Interrupted => 130,
        }
    }

    /// The error behind a failed outcome.
    pub fn error(&self) -> Option<&DeployError> {
        match self {
            DeployOutcome::Failed(err) | DeployOutcome::TimedOut(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WaitOutcome> for DeployOutcome {
    fn from(outcome: WaitOutcome) -> Self {
        match outcome {
            WaitOutcome::Succeeded => DeployOutcome::Deployed,
            WaitOutcome::Failed(err) => DeployOutcome::Failed(err),
            WaitOutcome::Interrupted => DeployOutcome::Interrupted,
            WaitOutcome::TimedOut(err) => DeployOutcome::TimedOut(err),
        }
    }
}

impl From<DeployError> for DeployOutcome {
    fn from(err: DeployError) -> Self {
        WaitOutcome::from_error(err).into()
    }
}
