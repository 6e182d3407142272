//! Workbook error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing an interchange workbook.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a zip container (or is damaged).
    #[error("Not a readable xlsx workbook: {detail}")]
    Archive { detail: String },

    /// A required part is absent from the archive.
    #[error("Workbook part {part} is missing")]
    MissingPart { part: String },

    /// A part is present but its XML cannot be read or written.
    #[error("Malformed workbook part {part}: {detail}")]
    Xml { part: String, detail: String },

    /// No sheet produced a SoC selection or a signal.
    #[error("No valid data found in workbook ({} sheet problem(s))", .diagnostics.len())]
    NoValidData { diagnostics: Vec<SheetDiagnostic> },
}

impl WorkbookError {
    pub(crate) fn xml(part: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self::Xml {
            part: part.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for WorkbookError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive {
            detail: err.to_string(),
        }
    }
}

/// What happened to a sheet or row during import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The whole sheet was skipped.
    SheetSkipped,
    /// A value was replaced (clamped, defaulted or dropped) and import went on.
    ValueAdjusted,
}

/// A recoverable import problem, reported per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDiagnostic {
    pub sheet: String,
    /// 1-based spreadsheet row, when the problem is tied to one.
    pub row: Option<usize>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl SheetDiagnostic {
    pub fn skipped(sheet: &str, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: None,
            kind: DiagnosticKind::SheetSkipped,
            message: message.into(),
        }
    }

    pub fn adjusted(sheet: &str, row: usize, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: Some(row),
            kind: DiagnosticKind::ValueAdjusted,
            message: message.into(),
        }
    }
}

impl fmt::Display for SheetDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "{} row {}: {}", self.sheet, row, self.message),
            None => write!(f, "{}: {}", self.sheet, self.message),
        }
    }
}

/// Result type alias for workbook operations.
pub type Result<T> = std::result::Result<T, WorkbookError>;
