//! Generation error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::kind::GeneratorKind;

/// Failure generating code.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No usable generator script was found or supplied.
    #[error("No {kind} generator script found{}", .path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    ScriptMissing {
        kind: GeneratorKind,
        path: Option<PathBuf>,
    },

    /// An artifact could not be written.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project cannot be turned into code.
    #[error("Cannot generate code: {reason}")]
    InvalidProject { reason: String },

    /// The generator script ran and failed (or could not be started).
    #[error("Generator script failed{}: {stderr}", .status.map(|s| format!(" with exit status {s}")).unwrap_or_default())]
    ScriptFailed { status: Option<i32>, stderr: String },

    /// Exporting the workbook handed to a script failed.
    #[error(transparent)]
    Workbook(#[from] sigm_workbook::WorkbookError),
}

impl GenerateError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidProject {
            reason: reason.into(),
        }
    }
}

/// Result type alias for generation.
pub type Result<T> = std::result::Result<T, GenerateError>;
