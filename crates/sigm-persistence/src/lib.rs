//! JSON persistence for signal manager projects.
//!
//! Project files are UTF-8 JSON documents, pretty-printed with a 4-space
//! indent and keys in insertion order. Loading is tolerant: unknown keys are
//! kept, legacy string-valued cores are promoted, and the SoC/build lists
//! are repaired by addition. Saving writes a sibling temp file and renames it
//! over the target, so a failed save never truncates the previous file.
//!
//! ```ignore
//! use sigm_persistence::{load_project, save_project};
//!
//! let project = load_project(Path::new("signals.json"))?;
//! save_project(&project, Path::new("copy.json"))?;
//! ```

mod error;
mod io;
mod tracker;

pub use error::{PersistenceError, Result};
pub use io::{from_json_str, load_project, save_project, to_json_string};
pub use tracker::DirtyTracker;
