//! Error types for editing and the session adapter.

use sigm_codegen::GenerateError;
use sigm_model::InvariantViolation;
use sigm_persistence::PersistenceError;
use sigm_validate::ValidationIssue;
use sigm_workbook::WorkbookError;
use thiserror::Error;

/// A rejected command. The project is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("unknown {kind} '{name}'")]
    UnknownTarget { kind: &'static str, name: String },

    #[error(transparent)]
    RangeViolation(InvariantViolation),

    #[error("{reason}")]
    InvariantBroken { reason: String },

    #[error("nothing has been copied")]
    ClipboardEmpty,
}

impl CommandError {
    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownTarget {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn broken(reason: impl Into<String>) -> Self {
        Self::InvariantBroken {
            reason: reason.into(),
        }
    }
}

impl From<InvariantViolation> for CommandError {
    fn from(violation: InvariantViolation) -> Self {
        if violation.is_range() {
            Self::RangeViolation(violation)
        } else {
            Self::broken(violation.to_string())
        }
    }
}

/// Undo or redo with nothing to undo or redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("nothing to {operation}")]
pub struct EmptyStack {
    pub operation: &'static str,
}

/// Failure of a session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Validation found errors; nothing was written.
    #[error("project has {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl SessionError {
    /// Validation errors behind an [`SessionError::Invalid`].
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_violations_keep_their_detail() {
        let violation = InvariantViolation::OutOfRange {
            signal: "s".to_string(),
            field: "Timeout",
            value: 0,
            min: 10,
            max: 1000,
            step: 10,
        };
        assert!(matches!(
            CommandError::from(violation.clone()),
            CommandError::RangeViolation(v) if v == violation
        ));

        let structural = InvariantViolation::SocTypeNotListed("X".to_string());
        assert_eq!(
            CommandError::from(structural),
            CommandError::broken("selected SoC 'X' is not in the SoC list")
        );
    }
}
