//! The validator and its report.

use chrono::NaiveDate;
use serde::Serialize;
use sigm_model::Project;

use crate::checks::{metadata, platform};
use crate::issue::{Severity, ValidationIssue};

/// Runs the pre-save checks in a fixed order.
///
/// The reference date and version baseline are explicit so the outcome
/// does not depend on the wall clock.
#[derive(Debug, Clone)]
pub struct Validator {
    today: NaiveDate,
    baseline_version: Option<String>,
}

impl Validator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            baseline_version: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Version the project was last loaded, saved or imported with.
    pub fn with_baseline_version(mut self, version: Option<String>) -> Self {
        self.baseline_version = version;
        self
    }

    pub fn validate(&self, project: &Project) -> ValidationReport {
        let meta = &project.metadata;
        let mut issues: Vec<ValidationIssue> = [
            metadata::check_editor(meta),
            metadata::check_version(meta, self.baseline_version.as_deref()),
            metadata::check_date(meta, self.today),
        ]
        .into_iter()
        .flatten()
        .collect();
        issues.extend(platform::check_invariants(project));
        issues.extend(platform::check_selected_soc_has_cores(project));
        issues.extend(platform::check_unreadable_values(project));

        let report = ValidationReport { issues };
        tracing::debug!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Validated project"
        );
        report
    }
}

/// Result of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Errors only, for callers that abort on them.
    pub fn into_errors(self) -> Vec<ValidationIssue> {
        self.issues
            .into_iter()
            .filter(ValidationIssue::is_error)
            .collect()
    }
}
