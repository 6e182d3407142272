//! Release metadata checks: editor, version, date.

use std::cmp::Ordering;

use chrono::NaiveDate;
use sigm_model::Metadata;

use crate::issue::{IssueCode, ValidationIssue};

/// Placeholder shown in the editor field of a fresh project.
pub const EDITOR_PLACEHOLDER: &str = "enter your name";

pub fn check_editor(metadata: &Metadata) -> Option<ValidationIssue> {
    let editor = metadata.editor.trim();
    if editor.is_empty() {
        return Some(ValidationIssue::new(
            IssueCode::EditorEmpty,
            "metadata.editor",
            "editor name is required",
        ));
    }
    if editor.eq_ignore_ascii_case(EDITOR_PLACEHOLDER) {
        return Some(ValidationIssue::new(
            IssueCode::EditorPlaceholder,
            "metadata.editor",
            "replace the placeholder editor name with your own",
        ));
    }
    None
}

/// `version` must be a non-negative decimal and must not go below the
/// version the project was last loaded or saved with.
pub fn check_version(metadata: &Metadata, baseline: Option<&str>) -> Option<ValidationIssue> {
    let Some(version) = Decimal::parse(&metadata.version) else {
        return Some(ValidationIssue::new(
            IssueCode::VersionInvalid,
            "metadata.version",
            format!("version '{}' is not a decimal number", metadata.version),
        ));
    };
    let baseline_text = baseline?;
    let baseline = Decimal::parse(baseline_text)?;
    (version < baseline).then(|| {
        ValidationIssue::new(
            IssueCode::VersionRegression,
            "metadata.version",
            format!(
                "version {} is lower than the saved version {}",
                metadata.version.trim(),
                baseline_text.trim()
            ),
        )
    })
}

pub fn check_date(metadata: &Metadata, today: NaiveDate) -> Option<ValidationIssue> {
    (metadata.date < today).then(|| {
        ValidationIssue::new(
            IssueCode::DateInPast,
            "metadata.date",
            format!("date {} is before today ({today})", metadata.date),
        )
    })
}

/// A non-negative decimal kept as digit strings so that `1.10` compares
/// below `1.9` and long versions never lose precision.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decimal {
    whole: String,
    fraction: String,
}

impl Decimal {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, ""),
        };
        let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !digits(whole) || !digits(fraction) || (raw.contains('.') && fraction.is_empty()) {
            return None;
        }
        let whole = whole.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');
        Some(Self {
            whole: whole.to_string(),
            fraction: fraction.to_string(),
        })
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.whole
            .len()
            .cmp(&other.whole.len())
            .then_with(|| self.whole.cmp(&other.whole))
            .then_with(|| self.fraction.cmp(&other.fraction))
    }
}
