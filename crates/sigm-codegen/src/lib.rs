//! Code generation for signal manager projects.
//!
//! The signal manager is emitted natively ([`SignalMgrGenerator`]); the IPC
//! and IPC-over-Ethernet managers are produced by external scripts that
//! consume the interchange workbook ([`ScriptGenerator`]). Both sit behind
//! the [`Generator`] trait, selected by [`GeneratorKind`].

mod error;
mod generator;
mod kind;
mod script;
mod signal_mgr;

pub use error::{GenerateError, Result};
pub use generator::{Generator, generator_for, locate_script};
pub use kind::{GeneratorKind, UnknownKind};
pub use script::{DEFAULT_INTERPRETER, ScriptGenerator, WORKBOOK_FILE};
pub use signal_mgr::{HEADER_FILE, SOURCE_FILE, SignalMgrGenerator, render_header, render_source};
