// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: The submitted state carries the action handle assigned by the control plane.

use crate::types::ActionId;

/// Initial state: request built, nothing sent yet.
/// Available actions: `already_exists()`, `submit()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Requested;

/// Submitted: the control plane accepted the request.
/// Available actions: `wait()`
#[derive(Debug, Clone)]
pub struct Submitted {
    pub(crate) action: ActionId,
}

impl Submitted {
    /// The action tracking this deployment.
    pub fn action(&self) -> &ActionId {
        &self.action
    }
}
