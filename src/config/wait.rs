// ABOUTME: Options controlling whether and how long to wait for a deployment.
// ABOUTME: A zero timeout means waiting without a limit.

use std::time::Duration;

/// Limit for a deployment to settle when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Time between two resource status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Stream logs and poll readiness after submission.
    pub wait: bool,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
    /// Do nothing when the pipeline is already deployed.
    pub skip_if_exists: bool,
}

impl WaitOptions {
    pub fn new(wait: bool) -> Self {
        Self {
            wait,
            ..Self::default()
        }
    }

    /// Set the timeout; a zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn with_skip_if_exists(mut self, skip: bool) -> Self {
        self.skip_if_exists = skip;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            wait: false,
            timeout: Some(DEFAULT_TIMEOUT),
            skip_if_exists: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_five_minutes() {
        assert_eq!(WaitOptions::default().timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn zero_timeout_waits_forever() {
        let options = WaitOptions::new(true).with_timeout(Duration::ZERO);
        assert!(options.wait);
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn explicit_timeout_is_kept() {
        let options = WaitOptions::new(true).with_timeout(Duration::from_secs(2));
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
    }
}
