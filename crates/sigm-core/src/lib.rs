//! Editing core for signal manager projects.
//!
//! [`CommandEngine`] applies the closed [`Command`] set with whole-project
//! undo/redo, a clipboard and a modified flag. [`Session`] wraps it with
//! file handling, the interchange workbook, validation and code generation
//! for a front-end, which plugs in through [`Host`].
//!
//! ```ignore
//! let mut session = Session::new();
//! session.apply(Command::add_signal("speed"))?;
//! session.undo()?;
//! session.save_project(Path::new("signals.json"))?;
//! ```

mod command;
mod engine;
mod error;
mod host;
mod session;

pub use command::Command;
pub use engine::{ClipboardEntry, CommandEngine};
pub use error::{CommandError, EmptyStack, Result, SessionError};
pub use host::{Host, NoHost};
pub use session::Session;
