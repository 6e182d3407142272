//! File I/O for project documents.
//!
//! - Loading with tolerant parsing and list repair
//! - Saving with atomic writes

mod load;
mod save;

pub use load::{from_json_str, load_project};
pub use save::{save_project, to_json_string};
