// ABOUTME: Diagnostics accumulator for non-fatal warnings raised by CLI input.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during a command run.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a command run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A flag that still works but will be removed.
    pub fn deprecated_flag(flag: &str, replacement: &str) -> Self {
        Self {
            kind: WarningKind::DeprecatedFlag,
            message: format!("{flag} is deprecated, use {replacement} instead"),
        }
    }

    /// Two flags given for the same setting; `winner` is used.
    pub fn conflicting_flags(winner: &str, ignored: &str) -> Self {
        Self {
            kind: WarningKind::ConflictingFlags,
            message: format!("both {winner} and {ignored} given, {ignored} is ignored"),
        }
    }
}

/// Categories of warnings that can occur during a command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A deprecated flag was used.
    DeprecatedFlag,
    /// Flags with overlapping meaning were combined.
    ConflictingFlags,
}
