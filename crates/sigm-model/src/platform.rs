//! Execution cores, and the `SoC.Core` identifiers that reference them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

/// Placeholder for an unset OS or SoC family.
pub const UNKNOWN: &str = "Unknown";

/// Properties of one core inside a SoC.
///
/// Older project files store a core as a bare description string; those are
/// promoted to a full record with defaults while deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CoreEntry")]
pub struct Core {
    pub description: String,
    pub is_master: bool,
    pub is_qnx: bool,
    pub is_autosar: bool,
    pub is_sim: bool,
    pub os: String,
    pub soc_family: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            description: String::new(),
            is_master: false,
            is_qnx: false,
            is_autosar: false,
            is_sim: false,
            os: UNKNOWN.to_string(),
            soc_family: UNKNOWN.to_string(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Core {
    /// A slave core with the given description and every flag cleared.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Label used by the `Master/Slave` workbook column.
    pub fn role(&self) -> &'static str {
        if self.is_master { "Master" } else { "Slave" }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoreEntry {
    Legacy(String),
    Full(CoreRecord),
}

#[derive(Deserialize)]
struct CoreRecord {
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_master: bool,
    #[serde(default)]
    is_qnx: bool,
    #[serde(default)]
    is_autosar: bool,
    #[serde(default)]
    is_sim: bool,
    #[serde(default = "unknown")]
    os: String,
    #[serde(default = "unknown")]
    soc_family: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

impl From<CoreEntry> for Core {
    fn from(entry: CoreEntry) -> Self {
        match entry {
            CoreEntry::Legacy(description) => Core::described(description),
            CoreEntry::Full(record) => Core {
                description: record.description,
                is_master: record.is_master,
                is_qnx: record.is_qnx,
                is_autosar: record.is_autosar,
                is_sim: record.is_sim,
                os: record.os,
                soc_family: record.soc_family,
                extra: record.extra,
            },
        }
    }
}

/// A `SoC.Core` reference, used for signal sources and destinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId {
    pub soc: String,
    pub core: String,
}

impl CoreId {
    pub fn new(soc: impl Into<String>, core: impl Into<String>) -> Self {
        Self {
            soc: soc.into(),
            core: core.into(),
        }
    }

    /// Destination flag key: `core_` followed by the identifier with every
    /// dot replaced by an underscore.
    pub fn destination_key(&self) -> String {
        destination_key(&self.to_string())
    }
}

/// Destination flag key for a raw `SoC.Core` string.
pub fn destination_key(core_id: &str) -> String {
    format!("core_{}", core_id.replace('.', "_"))
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.soc, self.core)
    }
}

impl FromStr for CoreId {
    type Err = ParseValueError;

    /// Splits at the first dot; both halves must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('.') {
            Some((soc, core)) if !soc.is_empty() && !core.is_empty() => {
                Ok(CoreId::new(soc, core))
            }
            _ => Err(ParseValueError::new("Source", trimmed)),
        }
    }
}
