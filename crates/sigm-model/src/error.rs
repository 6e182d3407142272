use thiserror::Error;

/// Failure to parse a textual model value (enum member, core id, data type).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} value: '{value}'")]
pub struct ParseValueError {
    pub field: &'static str,
    pub value: String,
}

impl ParseValueError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A broken project invariant.
///
/// Produced by [`crate::Project::invariant_violations`]; the validator and the
/// command engine translate these into their own error vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("selected SoC '{0}' is not in the SoC list")]
    SocTypeNotListed(String),

    #[error("selected build type '{0}' is not in the build list")]
    BuildTypeNotListed(String),

    #[error("SoC '{0}' has cores but is not in the SoC list")]
    CoreSocNotListed(String),

    #[error("'{0}' appears more than once in the SoC list")]
    DuplicateSoc(String),

    #[error("'{0}' appears more than once in the build list")]
    DuplicateBuildType(String),

    #[error("signal '{signal}' has unknown source '{source_id}'")]
    UnknownSource { signal: String, source_id: String },

    #[error("signal '{signal}' lists its source '{source_id}' as a destination")]
    SourceIsDestination { signal: String, source_id: String },

    #[error("signal '{signal}' has struct fields but is not a STRUCT")]
    StructFieldsWithoutStruct { signal: String },

    #[error("signal '{signal}' is a STRUCT without fields")]
    StructWithoutFields { signal: String },

    #[error("signal '{signal}' nests struct fields {depth} levels deep (max {max})")]
    StructTooDeep {
        signal: String,
        depth: usize,
        max: usize,
    },

    #[error(
        "signal '{signal}' field {field} = {value} is outside {min}..={max} (step {step})"
    )]
    OutOfRange {
        signal: String,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
        step: u32,
    },
}

impl InvariantViolation {
    /// True for numeric range violations (as opposed to structural ones).
    pub fn is_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
