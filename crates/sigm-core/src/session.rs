//! The front-end adapter.
//!
//! A [`Session`] owns one project, its edit history and the file it is
//! associated with. Every operation is synchronous and reports failure as
//! a value; nothing here prompts the user except through [`Host`].

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sigm_codegen::{GenerateError, GeneratorKind, generator_for, locate_script};
use sigm_model::{CoreId, Project, dates};
use sigm_validate::{ValidationReport, Validator};
use sigm_workbook::ImportOutcome;

use crate::command::Command;
use crate::engine::{ClipboardEntry, CommandEngine};
use crate::error::{CommandError, EmptyStack, Result, SessionError};
use crate::host::{Host, NoHost};

/// An editing session over one project.
#[derive(Debug)]
pub struct Session<H = NoHost> {
    engine: CommandEngine,
    host: H,
    current_file: Option<PathBuf>,
    /// Version the project was last opened, saved or imported with.
    baseline_version: Option<String>,
    reference_date: Option<NaiveDate>,
}

impl Session<NoHost> {
    /// A headless session holding the New template.
    pub fn new() -> Self {
        Self::with_host(NoHost)
    }
}

impl Default for Session<NoHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Session<H> {
    pub fn with_host(host: H) -> Self {
        Self {
            engine: CommandEngine::new(Project::new_template(dates::today())),
            host,
            current_file: None,
            baseline_version: None,
            reference_date: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Date validation and new templates treat as today.
    pub fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(dates::today)
    }

    /// Pin "today" for validation (`None` returns to the local date).
    pub fn set_reference_date(&mut self, date: Option<NaiveDate>) {
        self.reference_date = date;
    }

    /// Read-only view of the current project.
    pub fn snapshot(&self) -> &Project {
        self.engine.project()
    }

    pub fn is_modified(&self) -> bool {
        self.engine.is_modified()
    }

    /// File the project was opened from or last saved to.
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn baseline_version(&self) -> Option<&str> {
        self.baseline_version.as_deref()
    }

    pub fn available_cores(&self) -> Vec<CoreId> {
        self.snapshot().available_cores()
    }

    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.can_redo()
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.engine.clipboard()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replace the project with the New template.
    pub fn new_project(&mut self) -> &Project {
        let template = Project::new_template(self.today());
        self.install(template, None, None);
        tracing::info!("Started new project");
        self.snapshot()
    }

    /// Back to the New template with no file and no history.
    pub fn close_project(&mut self) {
        if let Some(path) = &self.current_file {
            tracing::info!(path = %path.display(), "Closed project");
        }
        let template = Project::new_template(self.today());
        self.install(template, None, None);
    }

    /// Load a project file and associate the session with it.
    ///
    /// On error the current project is untouched.
    pub fn open_project(&mut self, path: &Path) -> Result<&Project> {
        let project = sigm_persistence::load_project(path)?;
        let version = project.metadata.version.clone();
        self.install(project, Some(path.to_path_buf()), Some(version));
        Ok(self.snapshot())
    }

    /// Ask the host for a file and open it. `Ok(false)` if the host declined.
    pub fn open_chosen(&mut self) -> Result<bool> {
        match self.host.choose_open_path() {
            Some(path) => self.open_project(&path).map(|_| true),
            None => Ok(false),
        }
    }

    /// Validate, then write the project to `path`.
    ///
    /// Validation errors abort before anything is written. On success the
    /// session is associated with `path` and the modified flag is cleared.
    pub fn save_project(&mut self, path: &Path) -> Result<()> {
        self.ensure_valid()?;
        self.engine.start_save();
        if let Err(err) = sigm_persistence::save_project(self.engine.project(), path) {
            self.engine.save_failed();
            return Err(err.into());
        }
        self.current_file = Some(path.to_path_buf());
        self.baseline_version = Some(self.snapshot().metadata.version.clone());
        let flipped = self.engine.mark_saved();
        self.notify_modified(flipped);
        Ok(())
    }

    /// Save to the associated file, or ask the host for one.
    /// `Ok(false)` if there was no file and the host declined.
    pub fn save(&mut self) -> Result<bool> {
        let target = match self.current_file.clone() {
            Some(path) => Some(path),
            None => self.host.choose_save_path(None),
        };
        match target {
            Some(path) => self.save_project(&path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Ask the host for a new location and save there.
    pub fn save_as(&mut self) -> Result<bool> {
        match self.host.choose_save_path(self.current_file.as_deref()) {
            Some(path) => self.save_project(&path).map(|()| true),
            None => Ok(false),
        }
    }

    // =========================================================================
    // Interchange workbook
    // =========================================================================

    /// Import a workbook as one undoable replacement of the project.
    ///
    /// The imported version becomes the baseline for version checks. The
    /// associated file is kept so the next save overwrites it.
    pub fn import_tabular(&mut self, path: &Path) -> Result<ImportOutcome> {
        let outcome = sigm_workbook::import_workbook(path, self.today())?;
        for diagnostic in &outcome.diagnostics {
            tracing::warn!(
                sheet = %diagnostic.sheet,
                row = ?diagnostic.row,
                "{}",
                diagnostic.message
            );
        }
        self.apply(Command::ReplaceProject(Box::new(outcome.project.clone())))?;
        self.baseline_version = Some(outcome.project.metadata.version.clone());
        Ok(outcome)
    }

    /// Validate, then write the interchange workbook.
    pub fn export_tabular(&self, path: &Path) -> Result<()> {
        self.ensure_valid()?;
        sigm_workbook::export_workbook(self.snapshot(), path)?;
        Ok(())
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn apply(&mut self, command: Command) -> std::result::Result<(), CommandError> {
        let flipped = self.engine.apply(command)?;
        self.notify_modified(flipped);
        Ok(())
    }

    pub fn undo(&mut self) -> std::result::Result<(), EmptyStack> {
        let flipped = self.engine.undo()?;
        self.notify_modified(flipped);
        Ok(())
    }

    pub fn redo(&mut self) -> std::result::Result<(), EmptyStack> {
        let flipped = self.engine.redo()?;
        self.notify_modified(flipped);
        Ok(())
    }

    // =========================================================================
    // Validation and generation
    // =========================================================================

    pub fn validate(&self) -> ValidationReport {
        Validator::new(self.today())
            .with_baseline_version(self.baseline_version.clone())
            .validate(self.snapshot())
    }

    /// Validate, then run the generator for `kind` into `output_dir`.
    ///
    /// Script-backed kinds look for a script at `script`, then the
    /// project's `script_paths` entry, then the default install location,
    /// then ask the host. A path supplied by the host is stored in the
    /// project as one undoable edit.
    pub fn generate(
        &mut self,
        kind: GeneratorKind,
        output_dir: &Path,
        script: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        self.ensure_valid()?;
        let script = if kind.is_script_backed() {
            Some(self.resolve_script(kind, script)?)
        } else {
            None
        };
        let generator = generator_for(kind, script)?;
        let artifacts = generator.generate(self.snapshot(), output_dir)?;
        tracing::info!(
            kind = %kind,
            output = %output_dir.display(),
            artifacts = artifacts.len(),
            "Generated code"
        );
        Ok(artifacts)
    }

    fn resolve_script(&mut self, kind: GeneratorKind, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(found) = locate_script(kind, explicit, self.snapshot()) {
            return Ok(found);
        }
        let chosen = self
            .host
            .resolve_script_path(kind)
            .filter(|path| path.is_file())
            .ok_or(GenerateError::ScriptMissing {
                kind,
                path: explicit.map(Path::to_path_buf),
            })?;
        self.apply(Command::SetScriptPath {
            kind,
            path: chosen.clone(),
        })?;
        Ok(chosen)
    }

    fn ensure_valid(&self) -> Result<()> {
        let report = self.validate();
        for warning in report.warnings() {
            tracing::warn!(code = %warning.code, field = %warning.field, "{}", warning.message);
        }
        if report.has_errors() {
            return Err(SessionError::Invalid(report.into_errors()));
        }
        Ok(())
    }

    fn install(&mut self, project: Project, file: Option<PathBuf>, baseline: Option<String>) {
        let flipped = self.engine.reset(project);
        self.current_file = file;
        self.baseline_version = baseline;
        self.notify_modified(flipped);
    }

    fn notify_modified(&mut self, flipped: bool) {
        if flipped {
            self.host.modified_changed(self.engine.is_modified());
        }
    }
}
