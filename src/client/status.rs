// ABOUTME: Resource status values reported by the control plane.
// ABOUTME: Classifies raw status strings into error, transitioning, or stable.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Status reported for a resource that failed to deploy.
pub const ERROR_STATUS: &str = "error";

/// Statuses that mean "not settled yet". Anything not listed here and not
/// [`ERROR_STATUS`] counts as stable, so new terminal statuses added by the
/// control plane do not stall the wait.
pub const TRANSITIONAL_STATUSES: &[&str] = &[
    "building",
    "deploying",
    "destroying",
    "pending",
    "progressing",
    "pulling",
    "queued",
    "starting",
];

/// How a single status string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Transitioning,
    Stable,
}

/// A raw status string as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ResourceStatus(String);

impl ResourceStatus {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> StatusKind {
        if self.0 == ERROR_STATUS {
            StatusKind::Error
        } else if TRANSITIONAL_STATUSES.contains(&self.0.as_str()) {
            StatusKind::Transitioning
        } else {
            StatusKind::Stable
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statuses of every resource of a deployment at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ResourceStatusSnapshot(BTreeMap<String, ResourceStatus>);

impl ResourceStatusSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceStatus)> {
        self.0.iter().map(|(id, status)| (id.as_str(), status))
    }

    pub fn get(&self, resource: &str) -> Option<&ResourceStatus> {
        self.0.get(resource)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceStatusSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), ResourceStatus::new(v)))
                .collect(),
        )
    }
}
