//! Callbacks a front-end provides to the session.

use std::path::{Path, PathBuf};

use sigm_codegen::GeneratorKind;

/// UI hooks. Every method has a do-nothing default, so a headless caller
/// can use [`NoHost`].
pub trait Host {
    /// Ask the user for a project file to open.
    fn choose_open_path(&mut self) -> Option<PathBuf> {
        None
    }

    /// Ask the user where to save. `current` is the associated file, if any.
    fn choose_save_path(&mut self, _current: Option<&Path>) -> Option<PathBuf> {
        None
    }

    /// Ask the user for a generator script that could not be found.
    fn resolve_script_path(&mut self, _kind: GeneratorKind) -> Option<PathBuf> {
        None
    }

    /// The modified flag changed.
    fn modified_changed(&mut self, _modified: bool) {}
}

/// A host that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl Host for NoHost {}
