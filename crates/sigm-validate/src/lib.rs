//! Pre-save validation for signal manager projects.
//!
//! Checks run in a fixed order: editor, version, date, then the project
//! invariants, then advisories. Any error aborts save, export and code
//! generation; warnings are reported only.
//!
//! ```ignore
//! let report = Validator::new(today)
//!     .with_baseline_version(Some("1.0".to_string()))
//!     .validate(&project);
//! if report.has_errors() { /* abort */ }
//! ```

pub mod checks;
mod issue;
mod validator;

pub use checks::metadata::EDITOR_PLACEHOLDER;
pub use issue::{IssueCode, Severity, ValidationIssue};
pub use validator::{ValidationReport, Validator};
