//! The closed set of project edits.
//!
//! Every command except [`Command::CopySignal`] mutates the project and
//! becomes one undo step. Commands are applied to a scratch copy by the
//! engine, so an error here never leaves a half-edited project behind.

use std::path::PathBuf;

use sigm_codegen::GeneratorKind;
use sigm_model::{ApiConfig, Core, CoreId, Metadata, Project, Signal};

use crate::error::CommandError;

/// One project edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Signals
    AddSignal { name: String, signal: Signal },
    DeleteSignal { name: String },
    RenameSignal { from: String, to: String },
    UpdateSignal { name: String, signal: Signal },
    /// Put a signal on the clipboard. Does not touch the project.
    CopySignal { name: String },
    /// Insert the clipboard signal as `<name>`, `<name>_copy`, `<name>_copy1`, ...
    PasteSignal,

    // Selection and metadata
    SetSocType(String),
    SetBuildType(String),
    SetBoard(String),
    UpdateMetadata(Metadata),
    ReplaceProject(Box<Project>),

    // Platform configuration
    AddSoc(String),
    RemoveSoc(String),
    AddBuildType(String),
    RemoveBuildType(String),
    AddCore { soc: String, core: String, props: Core },
    UpdateCore { soc: String, core: String, props: Core },
    RemoveCore { soc: String, core: String },

    // Project settings
    SetBoardOptions(Vec<String>),
    SetPaths { output_path: String, script_path: String },
    SetApiConfig(ApiConfig),
    SetScriptPath { kind: GeneratorKind, path: PathBuf },
}

impl Command {
    /// Add a signal with the editor defaults.
    pub fn add_signal(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::AddSignal {
            signal: Signal::new(name.clone()),
            name,
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddSignal { .. } => "add_signal",
            Self::DeleteSignal { .. } => "delete_signal",
            Self::RenameSignal { .. } => "rename_signal",
            Self::UpdateSignal { .. } => "update_signal",
            Self::CopySignal { .. } => "copy_signal",
            Self::PasteSignal => "paste_signal",
            Self::SetSocType(_) => "set_soc_type",
            Self::SetBuildType(_) => "set_build_type",
            Self::SetBoard(_) => "set_board",
            Self::UpdateMetadata(_) => "update_metadata",
            Self::ReplaceProject(_) => "replace_project",
            Self::AddSoc(_) => "add_soc",
            Self::RemoveSoc(_) => "remove_soc",
            Self::AddBuildType(_) => "add_build_type",
            Self::RemoveBuildType(_) => "remove_build_type",
            Self::AddCore { .. } => "add_core",
            Self::UpdateCore { .. } => "update_core",
            Self::RemoveCore { .. } => "remove_core",
            Self::SetBoardOptions(_) => "set_board_options",
            Self::SetPaths { .. } => "set_paths",
            Self::SetApiConfig(_) => "set_api_config",
            Self::SetScriptPath { .. } => "set_script_path",
        }
    }

    /// Whether the command changes the project.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::CopySignal { .. })
    }

    /// Apply to `project` in place.
    ///
    /// Clipboard commands are resolved by the engine and rejected here.
    pub(crate) fn apply_to(self, project: &mut Project) -> Result<(), CommandError> {
        match self {
            Self::AddSignal { name, signal } => add_signal(project, name, signal),
            Self::DeleteSignal { name } => project
                .signals
                .shift_remove(&name)
                .map(drop)
                .ok_or_else(|| CommandError::unknown("signal", name)),
            Self::RenameSignal { from, to } => rename_signal(project, &from, to),
            Self::UpdateSignal { name, signal } => {
                let slot = project
                    .signals
                    .get_mut(&name)
                    .ok_or_else(|| CommandError::unknown("signal", name.as_str()))?;
                *slot = signal;
                Ok(())
            }
            Self::CopySignal { .. } | Self::PasteSignal => Err(CommandError::broken(
                "clipboard commands are handled by the engine",
            )),

            Self::SetSocType(soc) => {
                if !project.soc_list.contains(&soc) {
                    return Err(CommandError::unknown("SoC", soc));
                }
                project.soc_type = soc;
                Ok(())
            }
            Self::SetBuildType(build) => {
                if !project.build_list.contains(&build) {
                    return Err(CommandError::unknown("build type", build));
                }
                project.build_type = build;
                Ok(())
            }
            Self::SetBoard(board) => {
                project.selected_board = board;
                Ok(())
            }
            Self::UpdateMetadata(metadata) => {
                project.metadata = metadata;
                Ok(())
            }
            Self::ReplaceProject(replacement) => {
                *project = *replacement;
                Ok(())
            }

            Self::AddSoc(name) => add_soc(project, &name),
            Self::RemoveSoc(name) => remove_soc(project, &name),
            Self::AddBuildType(name) => {
                let name = required_name("build type", &name)?;
                if project.build_list.contains(&name) {
                    return Err(CommandError::duplicate("build type", name));
                }
                project.build_list.push(name);
                Ok(())
            }
            Self::RemoveBuildType(name) => {
                let index = project
                    .build_list
                    .iter()
                    .position(|build| *build == name)
                    .ok_or_else(|| CommandError::unknown("build type", name.as_str()))?;
                if project.build_type == name {
                    return Err(CommandError::broken(format!(
                        "build type '{name}' is selected and cannot be removed"
                    )));
                }
                project.build_list.remove(index);
                Ok(())
            }
            Self::AddCore { soc, core, props } => add_core(project, &soc, &core, props),
            Self::UpdateCore { soc, core, props } => {
                let slot = project
                    .core_info
                    .get_mut(&soc)
                    .and_then(|cores| cores.get_mut(&core))
                    .ok_or_else(|| CommandError::unknown("core", CoreId::new(soc, core).to_string()))?;
                *slot = props;
                Ok(())
            }
            Self::RemoveCore { soc, core } => remove_core(project, &CoreId::new(soc, core)),

            Self::SetBoardOptions(options) => {
                project.board_options = options;
                Ok(())
            }
            Self::SetPaths {
                output_path,
                script_path,
            } => {
                let paths = &mut project.project_specific.paths;
                paths.output_path = output_path;
                paths.script_path = script_path;
                Ok(())
            }
            Self::SetApiConfig(api_config) => {
                project.project_specific.api_config = api_config;
                Ok(())
            }
            Self::SetScriptPath { kind, path } => {
                project
                    .script_paths
                    .insert(kind.as_str().to_string(), path.display().to_string());
                Ok(())
            }
        }
    }

    /// Whether the post-edit check covers every signal or only list membership.
    ///
    /// Imported and dialog-built projects may carry signal-level problems
    /// the validator reports at save time.
    pub(crate) fn checks_signals(&self) -> bool {
        !matches!(self, Self::ReplaceProject(_))
    }
}

fn required_name(kind: &'static str, name: &str) -> Result<String, CommandError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CommandError::broken(format!("{kind} name is empty")));
    }
    Ok(trimmed.to_string())
}

fn add_signal(project: &mut Project, name: String, signal: Signal) -> Result<(), CommandError> {
    let name = required_name("signal", &name)?;
    if project.signals.contains_key(&name) {
        return Err(CommandError::duplicate("signal", name));
    }
    project.signals.insert(name, signal);
    Ok(())
}

/// Renames in place, keeping the signal's position. A port name that
/// tracked the old signal name follows it.
fn rename_signal(project: &mut Project, from: &str, to: String) -> Result<(), CommandError> {
    let to = required_name("signal", &to)?;
    if project.signals.contains_key(&to) {
        return Err(CommandError::duplicate("signal", to));
    }
    let (index, _, mut signal) = project
        .signals
        .shift_remove_full(from)
        .ok_or_else(|| CommandError::unknown("signal", from))?;
    if signal.variable_port_name == from {
        signal.variable_port_name.clone_from(&to);
    }
    project.signals.shift_insert(index, to, signal);
    Ok(())
}

fn add_soc(project: &mut Project, name: &str) -> Result<(), CommandError> {
    let name = required_name("SoC", name)?;
    if name.contains('.') {
        return Err(CommandError::broken(format!(
            "SoC name '{name}' must not contain '.'"
        )));
    }
    if project.soc_list.contains(&name) {
        return Err(CommandError::duplicate("SoC", name));
    }
    project.soc_list.push(name);
    Ok(())
}

fn remove_soc(project: &mut Project, name: &str) -> Result<(), CommandError> {
    let index = project
        .soc_list
        .iter()
        .position(|soc| soc == name)
        .ok_or_else(|| CommandError::unknown("SoC", name))?;
    if project.soc_type == name {
        return Err(CommandError::broken(format!(
            "SoC '{name}' is selected and cannot be removed"
        )));
    }
    if let Some(signal) = project.signals_sourced_from_soc(name).next() {
        return Err(CommandError::broken(format!(
            "SoC '{name}' is the source of signal '{signal}'"
        )));
    }
    project.soc_list.remove(index);
    if let Some(cores) = project.core_info.shift_remove(name) {
        for core in cores.keys() {
            clear_destination(project, &CoreId::new(name, core.as_str()));
        }
    }
    Ok(())
}

fn add_core(project: &mut Project, soc: &str, core: &str, props: Core) -> Result<(), CommandError> {
    if !project.soc_list.iter().any(|listed| listed == soc) {
        return Err(CommandError::unknown("SoC", soc));
    }
    let core = required_name("core", core)?;
    let cores = project.core_info.entry(soc.to_string()).or_default();
    if cores.contains_key(&core) {
        return Err(CommandError::duplicate(
            "core",
            CoreId::new(soc, core).to_string(),
        ));
    }
    cores.insert(core, props);
    Ok(())
}

fn remove_core(project: &mut Project, id: &CoreId) -> Result<(), CommandError> {
    if !project.has_core(id) {
        return Err(CommandError::unknown("core", id.to_string()));
    }
    if let Some(signal) = project.signals_sourced_from(id).next() {
        return Err(CommandError::broken(format!(
            "core '{id}' is the source of signal '{signal}'"
        )));
    }
    if let Some(cores) = project.core_info.get_mut(&id.soc) {
        cores.shift_remove(&id.core);
    }
    clear_destination(project, id);
    Ok(())
}

/// Drop the destination flag for a core from every signal.
fn clear_destination(project: &mut Project, id: &CoreId) {
    let key = id.destination_key();
    for signal in project.signals.values_mut() {
        signal.destinations.shift_remove(&key);
    }
}
