//! Validation issue types.

use std::fmt;

use serde::Serialize;
use sigm_model::InvariantViolation;

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// Blocks save, export and generation
    Error,
    /// Reported, never blocks
    Warning,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Stable issue codes, in the order checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Metadata checks
    EditorEmpty,
    EditorPlaceholder,
    VersionInvalid,
    VersionRegression,
    DateInPast,

    // Project invariants
    SocTypeNotListed,
    BuildTypeNotListed,
    CoreSocNotListed,
    DuplicateSoc,
    DuplicateBuildType,
    UnknownSource,
    SourceIsDestination,
    StructFieldsWithoutStruct,
    StructWithoutFields,
    StructTooDeep,
    OutOfRange,

    // Advisory
    SocTypeWithoutCores,
    UnreadableValue,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EditorEmpty => "EDITOR_EMPTY",
            Self::EditorPlaceholder => "EDITOR_PLACEHOLDER",
            Self::VersionInvalid => "VERSION_INVALID",
            Self::VersionRegression => "VERSION_REGRESSION",
            Self::DateInPast => "DATE_IN_PAST",
            Self::SocTypeNotListed => "SOC_TYPE_NOT_LISTED",
            Self::BuildTypeNotListed => "BUILD_TYPE_NOT_LISTED",
            Self::CoreSocNotListed => "CORE_SOC_NOT_LISTED",
            Self::DuplicateSoc => "DUPLICATE_SOC",
            Self::DuplicateBuildType => "DUPLICATE_BUILD_TYPE",
            Self::UnknownSource => "UNKNOWN_SOURCE",
            Self::SourceIsDestination => "SOURCE_IS_DESTINATION",
            Self::StructFieldsWithoutStruct => "STRUCT_FIELDS_WITHOUT_STRUCT",
            Self::StructWithoutFields => "STRUCT_WITHOUT_FIELDS",
            Self::StructTooDeep => "STRUCT_TOO_DEEP",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::SocTypeWithoutCores => "SOC_TYPE_WITHOUT_CORES",
            Self::UnreadableValue => "UNREADABLE_VALUE",
        }
    }

    /// Default severity for the code.
    pub fn severity(&self) -> Severity {
        match self {
            Self::SocTypeWithoutCores | Self::UnreadableValue => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding. `field` names the offending attribute as a dotted path
/// into the project document (`metadata.editor`, `signals.sig1.Timeout`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
            message: message.into(),
            severity: code.severity(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field, self.message)
    }
}

impl From<&InvariantViolation> for ValidationIssue {
    fn from(violation: &InvariantViolation) -> Self {
        use InvariantViolation as V;

        let (code, field) = match violation {
            V::SocTypeNotListed(_) => (IssueCode::SocTypeNotListed, "soc_type".to_string()),
            V::BuildTypeNotListed(_) => (IssueCode::BuildTypeNotListed, "build_type".to_string()),
            V::CoreSocNotListed(soc) => (IssueCode::CoreSocNotListed, format!("core_info.{soc}")),
            V::DuplicateSoc(_) => (IssueCode::DuplicateSoc, "soc_list".to_string()),
            V::DuplicateBuildType(_) => (IssueCode::DuplicateBuildType, "build_list".to_string()),
            V::UnknownSource { signal, .. } => {
                (IssueCode::UnknownSource, format!("signals.{signal}.Source"))
            }
            V::SourceIsDestination { signal, .. } => {
                (IssueCode::SourceIsDestination, format!("signals.{signal}.Source"))
            }
            V::StructFieldsWithoutStruct { signal } => (
                IssueCode::StructFieldsWithoutStruct,
                format!("signals.{signal}.struct_fields"),
            ),
            V::StructWithoutFields { signal } => (
                IssueCode::StructWithoutFields,
                format!("signals.{signal}.struct_fields"),
            ),
            V::StructTooDeep { signal, .. } => (
                IssueCode::StructTooDeep,
                format!("signals.{signal}.struct_fields"),
            ),
            V::OutOfRange { signal, field, .. } => {
                (IssueCode::OutOfRange, format!("signals.{signal}.{field}"))
            }
        };
        Self::new(code, field, violation.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_in_screaming_case() {
        for code in [IssueCode::EditorEmpty, IssueCode::SocTypeWithoutCores] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn range_violation_points_at_the_field() {
        let violation = InvariantViolation::OutOfRange {
            signal: "s".to_string(),
            field: "Timeout",
            value: 5,
            min: 10,
            max: 1000,
            step: 10,
        };
        let issue = ValidationIssue::from(&violation);
        assert_eq!(issue.code, IssueCode::OutOfRange);
        assert_eq!(issue.field, "signals.s.Timeout");
        assert!(issue.is_error());
    }
}
