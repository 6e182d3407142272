//! Interchange workbook for signal manager projects.
//!
//! The workbook has three sheets:
//!
//! - `Version`: one row of metadata (version, date, editor, description).
//! - `Config`: the SoC/build selection in columns A-B and the core table
//!   from column E.
//! - `LookUpTable`: one row per signal, fixed columns followed by one
//!   Yes/No column per destination core.
//!
//! Import is forgiving: a broken sheet is skipped and reported, bad cells are
//! defaulted or clamped and reported. Export writes all three sheets at once.

mod error;
mod export;
mod import;
pub mod layout;
pub mod xlsx;

pub use error::{DiagnosticKind, Result, SheetDiagnostic, WorkbookError};
pub use export::{build_workbook, export_bytes, export_workbook};
pub use import::{
    IMPORTED_DESCRIPTION, IMPORTED_SIGNAL_DESCRIPTION, ImportOutcome, import_bytes,
    import_workbook,
};
