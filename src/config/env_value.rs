// ABOUTME: Environment-backed setting values.
// ABOUTME: Resolves required and optional variables, treating empty values as unset.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Required(&'static str),
    Optional(&'static str),
}

impl EnvValue {
    pub fn required(var: &'static str) -> Self {
        EnvValue::Required(var)
    }

    pub fn optional(var: &'static str) -> Self {
        EnvValue::Optional(var)
    }

    pub fn var(&self) -> &'static str {
        match self {
            EnvValue::Required(var) | EnvValue::Optional(var) => var,
        }
    }

    /// Resolve the value, failing for an unset required variable.
    pub fn resolve(&self) -> Result<String> {
        match (self, self.lookup()) {
            (_, Some(value)) => Ok(value),
            (EnvValue::Required(var), None) => Err(Error::MissingEnvVar(var.to_string())),
            (EnvValue::Optional(_), None) => Ok(String::new()),
        }
    }

    /// Resolve the value, `None` when unset or empty.
    pub fn resolve_optional(&self) -> Option<String> {
        self.lookup()
    }

    fn lookup(&self) -> Option<String> {
        std::env::var(self.var()).ok().filter(|v| !v.is_empty())
    }
}
