//! Semantic data types of signals and struct fields.
//!
//! Project files store the type as a single string (`"UINT8"`,
//! `"ARRAY[4] OF UINT8"`, `"ENUM<1Byte>(Gear)"`, `"STRUCT"`). In memory it is
//! a tagged union; names outside the known grammar are kept verbatim as
//! [`DataType::Named`] so user-typed names survive a load/save cycle.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseValueError;

/// Maximum struct nesting depth; the signal's own struct counts as level 1.
pub const MAX_STRUCT_DEPTH: usize = 3;

/// Largest accepted array length.
pub const MAX_ARRAY_SIZE: u32 = 1000;

/// Primitive C-level types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    Boolean,
    Char,
    String,
}

impl BaseType {
    pub const ALL: &'static [BaseType] = &[
        BaseType::Int8,
        BaseType::Uint8,
        BaseType::Int16,
        BaseType::Uint16,
        BaseType::Int32,
        BaseType::Uint32,
        BaseType::Int64,
        BaseType::Uint64,
        BaseType::Float32,
        BaseType::Float64,
        BaseType::Boolean,
        BaseType::Char,
        BaseType::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Int8 => "INT8",
            BaseType::Uint8 => "UINT8",
            BaseType::Int16 => "INT16",
            BaseType::Uint16 => "UINT16",
            BaseType::Int32 => "INT32",
            BaseType::Uint32 => "UINT32",
            BaseType::Int64 => "INT64",
            BaseType::Uint64 => "UINT64",
            BaseType::Float32 => "FLOAT32",
            BaseType::Float64 => "FLOAT64",
            BaseType::Boolean => "BOOLEAN",
            BaseType::Char => "CHAR",
            BaseType::String => "STRING",
        }
    }

    /// The C token emitted for this type.
    pub fn c_token(&self) -> &'static str {
        match self {
            BaseType::Boolean => "bool_t",
            other => other.as_str(),
        }
    }

    fn lookup(name: &str) -> Option<BaseType> {
        BaseType::ALL
            .iter()
            .copied()
            .find(|base| base.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage width of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumWidth {
    OneByte,
    FourBytes,
}

impl EnumWidth {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumWidth::OneByte => "1Byte",
            EnumWidth::FourBytes => "4Byte",
        }
    }

    fn lookup(raw: &str) -> Option<EnumWidth> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1byte" | "1bytes" => Some(EnumWidth::OneByte),
            "4byte" | "4bytes" => Some(EnumWidth::FourBytes),
            _ => None,
        }
    }
}

/// A signal or struct-field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Primitive(BaseType),
    Struct,
    Array { element: Box<DataType>, size: u32 },
    Enum { width: EnumWidth, name: String },
    /// Any spelling outside the grammar, preserved as written.
    Named(String),
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Primitive(BaseType::Int32)
    }
}

impl DataType {
    pub fn is_struct(&self) -> bool {
        matches!(self, DataType::Struct)
    }

    /// The C spelling: base types map to their token, everything else is
    /// emitted exactly as declared.
    pub fn c_spelling(&self) -> String {
        match self {
            DataType::Primitive(base) => base.c_token().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Primitive(base) => f.write_str(base.as_str()),
            DataType::Struct => f.write_str("STRUCT"),
            DataType::Array { element, size } => write!(f, "ARRAY[{size}] OF {element}"),
            DataType::Enum { width, name } => write!(f, "ENUM<{}>({name})", width.as_str()),
            DataType::Named(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for DataType {
    type Err = ParseValueError;

    /// Never fails for non-empty input: unknown spellings become `Named`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(ParseValueError::new("DataType", s));
        }
        if raw.eq_ignore_ascii_case("STRUCT") {
            return Ok(DataType::Struct);
        }
        if let Some(base) = BaseType::lookup(raw) {
            return Ok(DataType::Primitive(base));
        }
        if let Some(array) = parse_array(raw) {
            return Ok(array);
        }
        if let Some(enumeration) = parse_enum(raw) {
            return Ok(enumeration);
        }
        Ok(DataType::Named(raw.to_string()))
    }
}

/// `ARRAY[n] OF T`
fn parse_array(raw: &str) -> Option<DataType> {
    let upper = raw.to_ascii_uppercase();
    let rest = upper.strip_prefix("ARRAY")?.trim_start();
    let rest = rest.strip_prefix('[')?;
    let close = rest.find(']')?;
    let size: u32 = rest[..close].trim().parse().ok()?;
    if size == 0 || size > MAX_ARRAY_SIZE {
        return None;
    }
    let after = rest[close + 1..].trim_start();
    let element_start = after.strip_prefix("OF")?;
    if !element_start.starts_with(char::is_whitespace) {
        return None;
    }
    // Slice the original text so a named element keeps its case.
    let offset = raw.len() - element_start.len();
    let element: DataType = raw[offset..].trim().parse().ok()?;
    if element.is_struct() {
        return None;
    }
    Some(DataType::Array {
        element: Box::new(element),
        size,
    })
}

/// `ENUM<1Byte>(Name)` / `ENUM<4Byte>(Name)`
fn parse_enum(raw: &str) -> Option<DataType> {
    if !raw.get(..4)?.eq_ignore_ascii_case("ENUM") {
        return None;
    }
    let rest = raw[4..].trim_start().strip_prefix('<')?;
    let close = rest.find('>')?;
    let width = EnumWidth::lookup(&rest[..close])?;
    let tail = rest[close + 1..].trim();
    let name = tail.strip_prefix('(')?.strip_suffix(')')?.trim();
    if name.is_empty() {
        return None;
    }
    Some(DataType::Enum {
        width,
        name: name.to_string(),
    })
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(DataType::default());
        }
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One member of a struct signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructField {
    #[serde(rename = "type", default)]
    pub field_type: DataType,
    #[serde(default)]
    pub description: String,
    /// Members of a nested struct (only when `field_type` is `STRUCT`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, StructField>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StructField {
    pub fn new(field_type: DataType, description: impl Into<String>) -> Self {
        Self {
            field_type,
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Nesting depth of a field map; an empty map has depth 0 and a flat struct
/// has depth 1.
pub fn struct_depth(fields: &IndexMap<String, StructField>) -> usize {
    if fields.is_empty() {
        return 0;
    }
    1 + fields
        .values()
        .map(|field| struct_depth(&field.fields))
        .max()
        .unwrap_or(0)
}
