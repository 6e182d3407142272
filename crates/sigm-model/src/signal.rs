//! Signals routed between cores.

use indexmap::IndexMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::datatype::{DataType, MAX_STRUCT_DEPTH, StructField, struct_depth};
use crate::enums::{Asil, Checksum, ImplApproach, InitValue, MemoryRegion, SignalType};
use crate::error::InvariantViolation;
use crate::platform::{CoreId, destination_key};

/// Prefix shared by every destination flag key.
pub const DESTINATION_PREFIX: &str = "core_";

/// Inclusive numeric range with a step, as enforced by the signal editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl FieldRange {
    pub const fn new(field: &'static str, min: u32, max: u32, step: u32) -> Self {
        Self {
            field,
            min,
            max,
            step,
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value) && (value - self.min) % self.step == 0
    }

    /// Clamp into range and snap to the nearest step (ties round up).
    pub fn clamp(&self, value: f64) -> u32 {
        if !value.is_finite() || value <= f64::from(self.min) {
            return self.min;
        }
        if value >= f64::from(self.max) {
            return self.max;
        }
        let steps = ((value - f64::from(self.min)) / f64::from(self.step)).round();
        let snapped = self.min + (steps as u32) * self.step;
        snapped.min(self.max)
    }
}

pub const BUFFER_COUNT_RANGE: FieldRange = FieldRange::new("Buffer count_IPC", 1, 10, 1);
pub const SM_BUFF_COUNT_RANGE: FieldRange = FieldRange::new("SM_Buff_Count", 1, 10, 1);
pub const TIMEOUT_RANGE: FieldRange = FieldRange::new("Timeout", 10, 1000, 10);
pub const PERIODICITY_RANGE: FieldRange = FieldRange::new("Periodicity", 10, 1000, 10);

/// One entry of the signal catalog.
///
/// Serialized with the exact key spellings of the project file. Destination
/// flags are stored flat beside the fixed keys (`"core_SocA_Core1": true`);
/// any other unrecognised key lands in `extra` and is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SignalRecord", into = "SignalRecord")]
pub struct Signal {
    pub variable_port_name: String,
    pub memory_region: MemoryRegion,
    pub buffer_count_ipc: u32,
    pub signal_type: SignalType,
    pub init_value: InitValue,
    pub notifiers: bool,
    /// Empty, or a `SoC.Core` identifier.
    pub source: String,
    pub impl_approach: ImplApproach,
    pub get_obj_ref: bool,
    pub sm_buff_count: u32,
    pub timeout: u32,
    pub periodicity: u32,
    pub asil: Asil,
    pub checksum: Checksum,
    pub data_type: DataType,
    pub description: String,
    pub struct_fields: IndexMap<String, StructField>,
    /// Literal initializer, used when `init_value` is `Custom`.
    pub custom_init_value: Option<String>,
    /// Destination flags keyed `core_<SoC>_<Core>`.
    pub destinations: IndexMap<String, bool>,
    pub extra: Map<String, Value>,
    /// File values that could not be read, keyed by file key. The typed
    /// field holds the editor default instead, which the next save writes.
    pub unreadable: IndexMap<String, String>,
}

impl Signal {
    /// A signal with the defaults the editor assigns on creation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            variable_port_name: name.into(),
            memory_region: MemoryRegion::Ddr,
            buffer_count_ipc: 1,
            signal_type: SignalType::Concurrent,
            init_value: InitValue::ZeroMemory,
            notifiers: false,
            source: String::new(),
            impl_approach: ImplApproach::SharedMemory,
            get_obj_ref: false,
            sm_buff_count: 1,
            timeout: 10,
            periodicity: 10,
            asil: Asil::Qm,
            checksum: Checksum::Additive,
            data_type: DataType::default(),
            description: "New signal".to_string(),
            struct_fields: IndexMap::new(),
            custom_init_value: None,
            destinations: IndexMap::new(),
            extra: Map::new(),
            unreadable: IndexMap::new(),
        }
    }

    pub fn is_struct(&self) -> bool {
        self.data_type.is_struct()
    }

    pub fn source_id(&self) -> Option<CoreId> {
        if self.source.trim().is_empty() {
            return None;
        }
        self.source.parse().ok()
    }

    pub fn is_destination(&self, core_id: &str) -> bool {
        self.destinations
            .get(&destination_key(core_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_destination(&mut self, core_id: &str, enabled: bool) {
        self.destinations.insert(destination_key(core_id), enabled);
    }

    /// Initializer expression for generated code.
    ///
    /// `None` when the signal asks for a custom value but has none.
    pub fn init_expr(&self) -> Option<&str> {
        match self.init_value {
            InitValue::ZeroMemory => Some("0"),
            InitValue::Custom => self
                .custom_init_value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty()),
        }
    }

    fn ranged_fields(&self) -> [(FieldRange, u32); 4] {
        [
            (BUFFER_COUNT_RANGE, self.buffer_count_ipc),
            (SM_BUFF_COUNT_RANGE, self.sm_buff_count),
            (TIMEOUT_RANGE, self.timeout),
            (PERIODICITY_RANGE, self.periodicity),
        ]
    }

    /// Numeric fields outside their declared range or step.
    pub fn range_violations(&self, name: &str) -> Vec<InvariantViolation> {
        self.ranged_fields()
            .into_iter()
            .filter(|(range, value)| !range.contains(*value))
            .map(|(range, value)| InvariantViolation::OutOfRange {
                signal: name.to_string(),
                field: range.field,
                value,
                min: range.min,
                max: range.max,
                step: range.step,
            })
            .collect()
    }

    /// Struct-shape violations: fields on a non-struct, a struct without
    /// fields, or nesting deeper than allowed.
    pub fn struct_violations(&self, name: &str) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        match (self.is_struct(), self.struct_fields.is_empty()) {
            (false, false) => violations.push(InvariantViolation::StructFieldsWithoutStruct {
                signal: name.to_string(),
            }),
            (true, true) => violations.push(InvariantViolation::StructWithoutFields {
                signal: name.to_string(),
            }),
            _ => {}
        }
        let depth = struct_depth(&self.struct_fields);
        if depth > MAX_STRUCT_DEPTH {
            violations.push(InvariantViolation::StructTooDeep {
                signal: name.to_string(),
                depth,
                max: MAX_STRUCT_DEPTH,
            });
        }
        violations
    }
}

/// On-disk shape of a signal.
#[derive(Serialize, Deserialize)]
struct SignalRecord {
    #[serde(rename = "Variable_Port_Name", default)]
    variable_port_name: String,
    #[serde(
        rename = "Memory Region",
        default = "FileValue::missing",
        deserialize_with = "lenient_enum"
    )]
    memory_region: FileValue<MemoryRegion>,
    #[serde(
        rename = "Buffer count_IPC",
        default = "FileValue::missing",
        deserialize_with = "lenient_u32"
    )]
    buffer_count_ipc: FileValue<u32>,
    #[serde(rename = "Type", default = "FileValue::missing", deserialize_with = "lenient_enum")]
    signal_type: FileValue<SignalType>,
    #[serde(
        rename = "InitValue",
        default = "FileValue::missing",
        deserialize_with = "lenient_enum"
    )]
    init_value: FileValue<InitValue>,
    #[serde(
        rename = "Notifiers",
        default = "FileValue::missing",
        deserialize_with = "lenient_bool"
    )]
    notifiers: FileValue<bool>,
    #[serde(rename = "Source", default)]
    source: String,
    #[serde(
        rename = "Impl_Approach",
        default = "FileValue::missing",
        deserialize_with = "lenient_enum"
    )]
    impl_approach: FileValue<ImplApproach>,
    #[serde(
        rename = "GetObjRef",
        default = "FileValue::missing",
        deserialize_with = "lenient_bool"
    )]
    get_obj_ref: FileValue<bool>,
    #[serde(
        rename = "SM_Buff_Count",
        default = "FileValue::missing",
        deserialize_with = "lenient_u32"
    )]
    sm_buff_count: FileValue<u32>,
    #[serde(rename = "Timeout", default = "FileValue::missing", deserialize_with = "lenient_u32")]
    timeout: FileValue<u32>,
    #[serde(
        rename = "Periodicity",
        default = "FileValue::missing",
        deserialize_with = "lenient_u32"
    )]
    periodicity: FileValue<u32>,
    #[serde(rename = "ASIL", default = "FileValue::missing", deserialize_with = "lenient_enum")]
    asil: FileValue<Asil>,
    #[serde(rename = "Checksum", default = "FileValue::missing", deserialize_with = "lenient_enum")]
    checksum: FileValue<Checksum>,
    #[serde(rename = "DataType", default)]
    data_type: DataType,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_struct: bool,
    #[serde(default)]
    struct_fields: IndexMap<String, StructField>,
    #[serde(
        rename = "CustomInitValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    custom_init_value: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// A typed value as found in the file.
enum FileValue<T> {
    Missing,
    Read(T),
    /// Present but not a valid value for the field.
    Unreadable(Value),
}

impl<T> FileValue<T> {
    fn missing() -> Self {
        Self::Missing
    }

    /// The value read, or `default`. An unreadable value is recorded under `key`.
    fn or_default(self, key: &str, default: T, unreadable: &mut IndexMap<String, String>) -> T {
        match self {
            Self::Read(value) => value,
            Self::Missing => default,
            Self::Unreadable(raw) => {
                let text = match raw {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                unreadable.insert(key.to_string(), text);
                default
            }
        }
    }
}

impl<T: Serialize> Serialize for FileValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Read(value) => value.serialize(serializer),
            Self::Missing => serializer.serialize_none(),
            Self::Unreadable(raw) => raw.serialize(serializer),
        }
    }
}

/// Any value the enum's parser accepts, in any case.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<FileValue<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::String(text) => text.parse::<T>().ok(),
        _ => None,
    };
    Ok(parsed.map_or(FileValue::Unreadable(value), FileValue::Read))
}

/// Integers, floats with no fraction, or numeric strings.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FileValue<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match number {
        Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
            FileValue::Read(n as u32)
        }
        _ => FileValue::Unreadable(value),
    })
}

/// Booleans, numbers, or the strings `true/false/yes/no` in any case.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FileValue<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let flag = match &value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => parse_flag(text),
        Value::Number(number) => Some(number.as_f64().is_some_and(|n| n != 0.0)),
        _ => None,
    };
    Ok(flag.map_or(FileValue::Unreadable(value), FileValue::Read))
}

/// Parse a yes/no style flag. Returns `None` for anything unrecognised.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "y" | "1" => Some(true),
        "no" | "false" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

impl From<SignalRecord> for Signal {
    fn from(record: SignalRecord) -> Self {
        let mut destinations = IndexMap::new();
        let mut extra = Map::new();
        for (key, value) in record.rest {
            match value {
                Value::Bool(enabled) if key.starts_with(DESTINATION_PREFIX) => {
                    destinations.insert(key, enabled);
                }
                other => {
                    extra.insert(key, other);
                }
            }
        }
        let defaults = Signal::new(String::new());
        let mut unreadable = IndexMap::new();
        let found = &mut unreadable;
        Signal {
            memory_region: record.memory_region.or_default(
                "Memory Region",
                defaults.memory_region,
                found,
            ),
            buffer_count_ipc: record.buffer_count_ipc.or_default(
                BUFFER_COUNT_RANGE.field,
                defaults.buffer_count_ipc,
                found,
            ),
            signal_type: record.signal_type.or_default("Type", defaults.signal_type, found),
            init_value: record.init_value.or_default("InitValue", defaults.init_value, found),
            notifiers: record.notifiers.or_default("Notifiers", defaults.notifiers, found),
            source: record.source,
            impl_approach: record.impl_approach.or_default(
                "Impl_Approach",
                defaults.impl_approach,
                found,
            ),
            get_obj_ref: record.get_obj_ref.or_default("GetObjRef", defaults.get_obj_ref, found),
            sm_buff_count: record.sm_buff_count.or_default(
                SM_BUFF_COUNT_RANGE.field,
                defaults.sm_buff_count,
                found,
            ),
            timeout: record.timeout.or_default(TIMEOUT_RANGE.field, defaults.timeout, found),
            periodicity: record.periodicity.or_default(
                PERIODICITY_RANGE.field,
                defaults.periodicity,
                found,
            ),
            asil: record.asil.or_default("ASIL", defaults.asil, found),
            checksum: record.checksum.or_default("Checksum", defaults.checksum, found),
            variable_port_name: record.variable_port_name,
            data_type: record.data_type,
            description: record.description,
            struct_fields: record.struct_fields,
            custom_init_value: record.custom_init_value,
            destinations,
            extra,
            unreadable,
        }
    }
}

impl From<Signal> for SignalRecord {
    fn from(signal: Signal) -> Self {
        let is_struct = signal.is_struct();
        let mut rest = Map::new();
        for (key, enabled) in signal.destinations {
            rest.insert(key, Value::Bool(enabled));
        }
        for (key, value) in signal.extra {
            rest.insert(key, value);
        }
        SignalRecord {
            variable_port_name: signal.variable_port_name,
            memory_region: FileValue::Read(signal.memory_region),
            buffer_count_ipc: FileValue::Read(signal.buffer_count_ipc),
            signal_type: FileValue::Read(signal.signal_type),
            init_value: FileValue::Read(signal.init_value),
            notifiers: FileValue::Read(signal.notifiers),
            source: signal.source,
            impl_approach: FileValue::Read(signal.impl_approach),
            get_obj_ref: FileValue::Read(signal.get_obj_ref),
            sm_buff_count: FileValue::Read(signal.sm_buff_count),
            timeout: FileValue::Read(signal.timeout),
            periodicity: FileValue::Read(signal.periodicity),
            asil: FileValue::Read(signal.asil),
            checksum: FileValue::Read(signal.checksum),
            data_type: signal.data_type,
            description: signal.description,
            is_struct,
            struct_fields: signal.struct_fields,
            custom_init_value: signal.custom_init_value,
            rest,
        }
    }
}
