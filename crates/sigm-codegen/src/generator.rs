//! The generator interface and shared output helpers.

use std::fs;
use std::path::{Path, PathBuf};

use sigm_model::Project;

use crate::error::{GenerateError, Result};
use crate::kind::GeneratorKind;
use crate::script::ScriptGenerator;
use crate::signal_mgr::SignalMgrGenerator;

/// Turns a project snapshot into files under an output directory.
pub trait Generator {
    fn kind(&self) -> GeneratorKind;

    /// Write every artifact and return their paths in write order.
    fn generate(&self, project: &Project, output_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Build the generator for `kind`.
///
/// Script-backed kinds need a script; `script` is ignored for the native
/// signal manager.
pub fn generator_for(kind: GeneratorKind, script: Option<PathBuf>) -> Result<Box<dyn Generator>> {
    if !kind.is_script_backed() {
        return Ok(Box::new(SignalMgrGenerator));
    }
    let script = script.ok_or(GenerateError::ScriptMissing { kind, path: None })?;
    Ok(Box::new(ScriptGenerator::new(kind, script)))
}

/// First existing script among: the explicit path, the project's
/// `script_paths` entry, and the default install location.
pub fn locate_script(
    kind: GeneratorKind,
    explicit: Option<&Path>,
    project: &Project,
) -> Option<PathBuf> {
    let configured = project
        .script_paths
        .get(kind.as_str())
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from);
    explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(configured)
        .chain(Some(kind.default_script_path()))
        .find(|path| path.is_file())
}

/// Write one artifact, creating the output directory if needed.
pub(crate) fn write_artifact(output_dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| GenerateError::WriteFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let path = output_dir.join(name);
    fs::write(&path, contents).map_err(|e| GenerateError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(path)
}
