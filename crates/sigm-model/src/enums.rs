//! Closed value sets for signal transport attributes.
//!
//! Each enum serializes to the exact spelling used in project files and in
//! the interchange workbook. Parsing is case-insensitive so that hand-edited
//! workbooks (`"ddr"`, `"yes"`) still load.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseValueError;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl $name {
            fn parse_known(s: &str) -> Result<Self, ParseValueError> {
                let trimmed = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|member| member.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ParseValueError::new($field, trimmed))
            }
        }
    };
}

string_enum! {
    /// Memory region backing the signal buffer.
    MemoryRegion, "Memory Region" {
        Ddr => "DDR",
        Cached => "Cached",
        NonCached => "NonCached",
    }
}

string_enum! {
    /// Access discipline for the signal buffer (`Type` column).
    SignalType, "Type" {
        Concurrent => "Concurrent",
        Sequential => "Sequential",
    }
}

string_enum! {
    /// Transport used to move the signal between cores.
    ImplApproach, "Impl_Approach" {
        SharedMemory => "SharedMemory",
        Vring => "VRING",
        IpcOvEth => "IpcOvEth",
    }
}

string_enum! {
    /// Integrity check applied to the payload.
    Checksum, "Checksum" {
        None => "None",
        Additive => "Additive",
        CustomChecksum => "CustomChecksum",
    }
}

string_enum! {
    /// Automotive safety-integrity level.
    Asil, "ASIL" {
        Qm => "QM",
        A => "A",
        B => "B",
        C => "C",
        D => "D",
    }
}

string_enum! {
    /// How the signal storage is initialised.
    InitValue, "InitValue" {
        ZeroMemory => "ZeroMemory",
        Custom => "Custom",
    }
}

impl FromStr for MemoryRegion {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s)
    }
}

impl FromStr for SignalType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s)
    }
}

impl FromStr for ImplApproach {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s)
    }
}

impl FromStr for Checksum {
    type Err = ParseValueError;

    /// An empty cell means no checksum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Checksum::None);
        }
        Self::parse_known(s)
    }
}

impl FromStr for Asil {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s)
    }
}

impl FromStr for InitValue {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s)
    }
}

/// Operating systems offered by the core properties editor.
///
/// `Core::os` is free-form; anything outside this list is kept verbatim.
pub const RECOGNIZED_OS: &[&str] = &[
    "Autosar", "QNX", "FreeRTOS", "SafeRTOS", "TI-RTOS", "Linux", "Windows", "Unknown",
];

/// SoC vendor families offered by the core properties editor.
pub const RECOGNIZED_SOC_FAMILIES: &[&str] = &[
    "TI",
    "Tricore",
    "NXP",
    "Intel",
    "AMD",
    "Infineon",
    "Qualcomm",
    "NVIDIA",
    "Raspberry Pi",
    "Unknown",
];

/// Build layouts every new project knows about.
pub const KNOWN_BUILD_TYPES: &[&str] = &["SMP", "MultiImage", "Simulation"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("ddr".parse::<MemoryRegion>().unwrap(), MemoryRegion::Ddr);
        assert_eq!(" vring ".parse::<ImplApproach>().unwrap(), ImplApproach::Vring);
        assert_eq!("qm".parse::<Asil>().unwrap(), Asil::Qm);
    }

    #[test]
    fn empty_checksum_is_none() {
        assert_eq!("".parse::<Checksum>().unwrap(), Checksum::None);
    }

    #[test]
    fn unknown_value_reports_field() {
        let err = "Bogus".parse::<SignalType>().unwrap_err();
        assert_eq!(err.field, "Type");
        assert_eq!(err.value, "Bogus");
    }

    #[test]
    fn serializes_canonical_spelling() {
        let json = serde_json::to_string(&ImplApproach::IpcOvEth).unwrap();
        assert_eq!(json, "\"IpcOvEth\"");
        let back: ImplApproach = serde_json::from_str("\"sharedmemory\"").unwrap();
        assert_eq!(back, ImplApproach::SharedMemory);
    }
}
