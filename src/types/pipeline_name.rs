// ABOUTME: Validated pipeline name used as the key on the control plane.
// ABOUTME: Can be derived from a repository URL when the user does not pass one.

use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineNameError {
    #[error("pipeline name cannot be empty")]
    Empty,

    #[error("pipeline name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("invalid character in pipeline name: '{0}'")]
    InvalidChar(char),

    #[error("cannot derive a pipeline name from repository '{0}'")]
    Underivable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineName(String);

impl PipelineName {
    pub fn new(value: &str) -> Result<Self, PipelineNameError> {
        if value.is_empty() {
            return Err(PipelineNameError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(PipelineNameError::TooLong);
        }

        if let Some(c) = value
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || *c == '/')
        {
            return Err(PipelineNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    /// Derive a name from a repository URL.
    ///
    /// Takes the last path segment, drops a trailing `.git`, lowercases it and
    /// replaces anything outside `[a-z0-9-]` with a hyphen. Works for both
    /// `https://host/org/repo.git` and `git@host:org/repo.git` forms.
    pub fn from_repository(repository: &str) -> Result<Self, PipelineNameError> {
        let trimmed = repository.trim().trim_end_matches('/');
        let last = trimmed
            .rsplit(['/', ':'])
            .next()
            .unwrap_or_default();
        let last = last.strip_suffix(".git").unwrap_or(last);

        let translated: String = last
            .chars()
            .map(|c| {
                let c = c.to_ascii_lowercase();
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        let translated = translated.trim_matches('-');

        if translated.is_empty() {
            return Err(PipelineNameError::Underivable(repository.to_string()));
        }

        let truncated: String = translated.chars().take(MAX_LEN).collect();
        Self::new(truncated.trim_end_matches('-'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipelineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
