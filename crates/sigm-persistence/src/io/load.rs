//! Project loading operations.

use std::fs;
use std::path::Path;

use sigm_model::Project;

use crate::error::{PersistenceError, Result};

/// Load a project from a JSON file.
///
/// On any error nothing is returned, so a caller's in-memory project is left
/// as it was.
pub fn load_project(path: &Path) -> Result<Project> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;

    let project = from_json_str(&text, path)?;

    tracing::info!(
        path = %path.display(),
        signals = project.signals.len(),
        socs = project.soc_list.len(),
        "Loaded project"
    );
    Ok(project)
}

/// Parse a project document. `path` is only used for error reporting.
pub fn from_json_str(text: &str, path: &Path) -> Result<Project> {
    let mut project: Project =
        serde_json::from_str(text).map_err(|e| PersistenceError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            column: e.column(),
            source: e,
        })?;

    if project.normalize() {
        tracing::debug!(path = %path.display(), "Repaired SoC/build lists on load");
    }
    for (name, signal) in &project.signals {
        for (field, raw) in &signal.unreadable {
            tracing::warn!(
                path = %path.display(),
                signal = %name,
                field = %field,
                "Unreadable value '{raw}', using the default"
            );
        }
    }
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save::save_project;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_project(&dir.path().join("absent.json"));
        assert!(matches!(
            result,
            Err(PersistenceError::Io {
                operation: "read",
                ..
            })
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\n  \"metadata\": {\n  oops").unwrap();

        let err = load_project(&path).unwrap_err();
        match &err {
            PersistenceError::Parse { line, .. } => assert_eq!(*line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_load_repairs_lists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(
            &path,
            r#"{"soc_type": "SocA", "build_type": "SMP", "soc_list": [], "build_list": ["SMP"],
                "core_info": {"SocB": {"Core0": "b"}}}"#,
        )
        .unwrap();

        let project = load_project(&path).unwrap();
        assert_eq!(project.soc_list, ["SocA", "SocB"]);
        assert!(project.structural_violations().is_empty());
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut project = Project::default();
        project.metadata.editor = "alice".to_string();

        save_project(&project, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded, project);
    }
}
