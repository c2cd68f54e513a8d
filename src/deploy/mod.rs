// ABOUTME: Deployment orchestration: submission, readiness polling, and progress streaming.
// ABOUTME: Uses the type state pattern so only submitted deployments can be waited on.

mod coordinator;
mod deployment;
mod error;
mod outcome;
mod readiness;
mod request;
mod state;
mod stream;
mod submit;

pub use coordinator::WaitCoordinator;
pub use deployment::Deployment;
pub use error::{DeployError, DeployErrorKind};
pub use outcome::{DeployOutcome, WaitOutcome, WaitState};
pub use readiness::{Readiness, ReadinessPoller, evaluate};
pub use request::{DeploymentRequest, parse_variable, parse_variables};
pub use state::{Requested, Submitted};
pub use stream::{LogSink, ProgressStreamer, StreamError};
pub use submit::submit_request;
