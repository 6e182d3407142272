//! Project saving operations.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use sigm_model::Project;

use crate::error::{PersistenceError, Result};

const INDENT: &[u8] = b"    ";

/// Render a project as its canonical document text.
pub fn to_json_string(project: &Project) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    project
        .serialize(&mut serializer)
        .map_err(|e| PersistenceError::Serialization { source: e })?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Save a project to a JSON file.
///
/// Uses atomic write (temp file + rename) so the previous content survives
/// any failure.
pub fn save_project(project: &Project, path: &Path) -> Result<()> {
    let text = to_json_string(project)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path);
    if let Err(err) = write_synced(&temp_path, text.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistenceError::AtomicWriteFailed {
            temp_path,
            target_path: path.to_path_buf(),
            source: e,
        });
    }

    tracing::info!(
        path = %path.display(),
        signals = project.signals.len(),
        "Saved project"
    );
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: path.to_path_buf(),
        source: e,
    })?;

    file.write_all(bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source: e,
    })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: path.to_path_buf(),
        source: e,
    })
}

/// `signals.json` -> `.signals.json.tmp` in the same directory, so the
/// rename never crosses a filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn template() -> Project {
        Project::new_template(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap())
    }

    #[test]
    fn test_save_project() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("test.json");

        save_project(&template(), &path).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join(".test.json.tmp").exists());
    }

    #[test]
    fn test_four_space_indent() {
        let text = to_json_string(&template()).unwrap();
        assert!(text.starts_with("{\n    \"metadata\": {\n        \"version\": \"1.0\","));
        assert!(text.contains("\n    \"soc_list\": [\n        \"Windows\"\n    ],"));
    }

    #[test]
    fn test_failed_save_keeps_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keep.json");
        fs::write(&path, "previous").unwrap();

        // A directory squatting on the temp name makes File::create fail.
        fs::create_dir(dir.path().join(".keep.json.tmp")).unwrap();
        let result = save_project(&template(), &path);

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    }
}
