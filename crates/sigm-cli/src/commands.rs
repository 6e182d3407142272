//! Subcommand implementations over a headless [`Session`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sigm_codegen::GeneratorKind;
use sigm_core::Session;
use sigm_model::Project;
use sigm_validate::ValidationReport;
use sigm_workbook::SheetDiagnostic;

/// What `import` produced.
#[derive(Debug)]
pub struct ImportSummary {
    pub saved_to: PathBuf,
    pub signals: usize,
    pub diagnostics: Vec<SheetDiagnostic>,
}

fn session(reference_date: Option<NaiveDate>) -> Session {
    let mut session = Session::new();
    session.set_reference_date(reference_date);
    session
}

fn open(path: &Path, reference_date: Option<NaiveDate>) -> Result<Session> {
    let mut session = session(reference_date);
    session
        .open_project(path)
        .with_context(|| format!("open {}", path.display()))?;
    Ok(session)
}

pub fn run_show(path: &Path) -> Result<Project> {
    let session = open(path, None)?;
    Ok(session.snapshot().clone())
}

pub fn run_validate(path: &Path, reference_date: Option<NaiveDate>) -> Result<ValidationReport> {
    Ok(open(path, reference_date)?.validate())
}

pub fn run_export(project: &Path, output: &Path, reference_date: Option<NaiveDate>) -> Result<()> {
    let session = open(project, reference_date)?;
    session
        .export_tabular(output)
        .with_context(|| format!("export {}", output.display()))?;
    Ok(())
}

/// Import a workbook and save it as a project file. The saved project must
/// pass validation like any other save.
pub fn run_import(
    input: &Path,
    output: &Path,
    reference_date: Option<NaiveDate>,
) -> Result<ImportSummary> {
    let mut session = session(reference_date);
    let outcome = session
        .import_tabular(input)
        .with_context(|| format!("import {}", input.display()))?;
    session
        .save_project(output)
        .with_context(|| format!("save {}", output.display()))?;
    Ok(ImportSummary {
        saved_to: output.to_path_buf(),
        signals: outcome.project.signals.len(),
        diagnostics: outcome.diagnostics,
    })
}

pub fn run_generate(
    project: &Path,
    kind: GeneratorKind,
    output_dir: &Path,
    script: Option<&Path>,
    reference_date: Option<NaiveDate>,
) -> Result<Vec<PathBuf>> {
    let mut session = open(project, reference_date)?;
    session
        .generate(kind, output_dir, script)
        .with_context(|| format!("generate {kind} into {}", output_dir.display()))
}
