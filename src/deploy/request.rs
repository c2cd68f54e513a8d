// ABOUTME: Deployment request built from user input before submission.
// ABOUTME: Parses KEY=VALUE variables into the wire spec sent to the control plane.

use crate::client::{DeploySpec, Variable};
use crate::types::PipelineName;

use super::DeployError;

/// Everything needed to ask the control plane for a deployment.
///
/// Variables stay in their raw `KEY=VALUE` form until submission so a
/// malformed entry is reported right before the network call.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    name: PipelineName,
    repository: String,
    branch: Option<String>,
    file: Option<String>,
    variables: Vec<String>,
    namespace: String,
}

impl DeploymentRequest {
    /// Create a request. Repository and namespace must be non-empty.
    pub fn new(
        name: PipelineName,
        repository: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<Self, DeployError> {
        let repository = repository.into();
        let namespace = namespace.into();

        if repository.trim().is_empty() {
            return Err(DeployError::InvalidRequest(
                "repository cannot be empty".to_string(),
            ));
        }
        if namespace.trim().is_empty() {
            return Err(DeployError::InvalidRequest(
                "namespace cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            name,
            repository,
            branch: None,
            file: None,
            variables: Vec::new(),
            namespace,
        })
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.is_empty());
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file.filter(|f| !f.is_empty());
        self
    }

    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn name(&self) -> &PipelineName {
        &self.name
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Build the wire spec, failing on the first malformed variable.
    pub fn to_spec(&self) -> Result<DeploySpec, DeployError> {
        Ok(DeploySpec {
            name: self.name.clone(),
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            file: self.file.clone(),
            variables: parse_variables(&self.variables)?,
        })
    }
}

/// Split a `KEY=VALUE` entry on its first `=`.
pub fn parse_variable(entry: &str) -> Result<Variable, DeployError> {
    let (name, value) = entry
        .split_once('=')
        .ok_or_else(|| DeployError::InvalidVariable(entry.to_string()))?;

    Ok(Variable {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parse entries in order; the first invalid one aborts.
pub fn parse_variables(entries: &[String]) -> Result<Vec<Variable>, DeployError> {
    entries.iter().map(|entry| parse_variable(entry)).collect()
}
