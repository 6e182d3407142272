//! Configuration model for the signal manager.
//!
//! A [`Project`] describes the target platform (SoCs, cores, build layout)
//! and the catalog of [`Signal`]s routed between cores. Values are plain
//! data; edits go through the command engine in `sigm-core`.

pub mod datatype;
pub mod dates;
pub mod enums;
pub mod error;
pub mod platform;
pub mod project;
pub mod signal;

pub use datatype::{BaseType, DataType, EnumWidth, MAX_ARRAY_SIZE, MAX_STRUCT_DEPTH, StructField};
pub use enums::{
    Asil, Checksum, ImplApproach, InitValue, KNOWN_BUILD_TYPES, MemoryRegion, RECOGNIZED_OS,
    RECOGNIZED_SOC_FAMILIES, SignalType,
};
pub use error::{InvariantViolation, ParseValueError};
pub use platform::{Core, CoreId, destination_key};
pub use project::{
    ApiConfig, CoreApi, DEFAULT_EXPORT_SHEET, Metadata, Paths, Project, ProjectSpecific, SmpApi,
    api_core_key,
};
pub use signal::{
    BUFFER_COUNT_RANGE, FieldRange, PERIODICITY_RANGE, SM_BUFF_COUNT_RANGE, Signal, TIMEOUT_RANGE,
    parse_flag,
};
