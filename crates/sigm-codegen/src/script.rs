//! Script-backed generators.
//!
//! The IPC generators live outside this tool as Python scripts. They read
//! the interchange workbook, so generation exports the project next to the
//! output and runs the script against it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use sigm_model::Project;

use crate::error::{GenerateError, Result};
use crate::generator::Generator;
use crate::kind::GeneratorKind;

/// Workbook handed to generator scripts.
pub const WORKBOOK_FILE: &str = "signal_data.xlsx";

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Runs `<interpreter> <script> -f <xlsx> -i <interface> -B <board> -O <dir>`.
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    kind: GeneratorKind,
    script: PathBuf,
    interpreter: OsString,
}

impl ScriptGenerator {
    pub fn new(kind: GeneratorKind, script: PathBuf) -> Self {
        Self {
            kind,
            script,
            interpreter: OsString::from(DEFAULT_INTERPRETER),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<OsString>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    fn command(&self, workbook: &Path, board: &str, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.interpreter);
        command.arg(&self.script).arg("-f").arg(workbook);
        if let Some(interface) = self.kind.interface_flag() {
            command.arg("-i").arg(interface);
        }
        command.arg("-B").arg(board).arg("-O").arg(output_dir);
        command
    }
}

impl Generator for ScriptGenerator {
    fn kind(&self) -> GeneratorKind {
        self.kind
    }

    fn generate(&self, project: &Project, output_dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.script.is_file() {
            return Err(GenerateError::ScriptMissing {
                kind: self.kind,
                path: Some(self.script.clone()),
            });
        }
        let board = project.selected_board.trim();
        if board.is_empty() {
            return Err(GenerateError::invalid("no board selected"));
        }

        let workbook = output_dir.join(WORKBOOK_FILE);
        sigm_workbook::export_workbook(project, &workbook)?;

        let mut command = self.command(&workbook, board, output_dir);
        tracing::info!(
            kind = %self.kind,
            script = %self.script.display(),
            board,
            output = %output_dir.display(),
            "Running generator script"
        );
        let output = command.output().map_err(|e| GenerateError::ScriptFailed {
            status: None,
            stderr: format!("could not start {}: {e}", self.interpreter.to_string_lossy()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(kind = %self.kind, status = ?output.status.code(), "Generator script failed");
            return Err(GenerateError::ScriptFailed {
                status: output.status.code(),
                stderr,
            });
        }
        Ok(vec![workbook])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn project(board: &str) -> Project {
        let mut project = Project::new_template(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        project.selected_board = board.to_string();
        project
    }

    #[test]
    fn arguments_follow_script_convention() {
        let generator = ScriptGenerator::new(GeneratorKind::IpcEthMgr, PathBuf::from("gen.py"));
        let command = generator.command(Path::new("out/signal_data.xlsx"), "evm", Path::new("out"));
        let args: Vec<String> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(command.get_program(), "python3");
        assert_eq!(
            args,
            ["gen.py", "-f", "out/signal_data.xlsx", "-i", "IpcOvEth", "-B", "evm", "-O", "out"]
        );
    }

    #[test]
    fn missing_script_is_reported_before_anything_is_written() {
        let dir = tempdir().unwrap();
        let generator = ScriptGenerator::new(GeneratorKind::IpcManager, dir.path().join("none.py"));
        let err = generator.generate(&project("evm"), dir.path()).unwrap_err();
        assert!(matches!(err, GenerateError::ScriptMissing { path: Some(_), .. }));
        assert!(!dir.path().join(WORKBOOK_FILE).exists());
    }

    #[test]
    fn board_is_required() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("gen.py");
        std::fs::write(&script, "").unwrap();
        let generator = ScriptGenerator::new(GeneratorKind::IpcManager, script);
        let err = generator.generate(&project(" "), dir.path()).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidProject { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn script_output_and_failure_status_are_surfaced() {
        let dir = tempdir().unwrap();
        let ok = dir.path().join("ok.sh");
        std::fs::write(&ok, "touch \"$8/generated.c\"\n").unwrap();
        let generator = ScriptGenerator::new(GeneratorKind::IpcManager, ok).with_interpreter("sh");
        let out = dir.path().join("out");
        let artifacts = generator.generate(&project("evm"), &out).unwrap();
        assert_eq!(artifacts, [out.join(WORKBOOK_FILE)]);
        assert!(out.join("generated.c").exists());

        let failing = dir.path().join("fail.sh");
        std::fs::write(&failing, "echo broken >&2\nexit 3\n").unwrap();
        let generator =
            ScriptGenerator::new(GeneratorKind::IpcManager, failing).with_interpreter("sh");
        match generator.generate(&project("evm"), &out) {
            Err(GenerateError::ScriptFailed { status, stderr }) => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected ScriptFailed, got {other:?}"),
        }
    }
}
