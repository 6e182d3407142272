//! Undo/redo over whole-project snapshots.

use sigm_model::{Project, Signal};
use sigm_persistence::DirtyTracker;

use crate::command::Command;
use crate::error::{CommandError, EmptyStack};

/// A copied signal waiting to be pasted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    /// Name the signal was copied under; the paste name is derived from it.
    pub name: String,
    pub signal: Signal,
}

/// Owns the project and its edit history.
///
/// Each successful mutating command pushes the previous project onto the
/// undo stack and clears the redo stack. Commands are never coalesced.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    project: Project,
    undo_stack: Vec<Project>,
    redo_stack: Vec<Project>,
    clipboard: Option<ClipboardEntry>,
    dirty: DirtyTracker,
}

impl CommandEngine {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            clipboard: None,
            dirty: DirtyTracker::new(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn is_modified(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    /// Apply one command.
    ///
    /// Returns true when the modified flag flipped. On error the project,
    /// both stacks and the flag are untouched.
    pub fn apply(&mut self, command: Command) -> Result<bool, CommandError> {
        let label = command.label();
        let command = match command {
            Command::CopySignal { name } => {
                let signal = self
                    .project
                    .signals
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| CommandError::unknown("signal", name.as_str()))?;
                tracing::debug!(signal = %name, "Copied signal");
                self.clipboard = Some(ClipboardEntry { name, signal });
                return Ok(false);
            }
            Command::PasteSignal => {
                let entry = self.clipboard.as_ref().ok_or(CommandError::ClipboardEmpty)?;
                Command::AddSignal {
                    name: self.project.unique_copy_name(&entry.name),
                    signal: entry.signal.clone(),
                }
            }
            other => other,
        };

        let checks_signals = command.checks_signals();
        let mut candidate = self.project.clone();
        command.apply_to(&mut candidate)?;
        check_new_violations(&self.project, &candidate, checks_signals)?;

        let previous = std::mem::replace(&mut self.project, candidate);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        tracing::debug!(
            command = label,
            undo_depth = self.undo_stack.len(),
            "Applied command"
        );
        Ok(self.dirty.mark_dirty())
    }

    /// Step back one command. Returns true when the modified flag flipped.
    pub fn undo(&mut self) -> Result<bool, EmptyStack> {
        let previous = self
            .undo_stack
            .pop()
            .ok_or(EmptyStack { operation: "undo" })?;
        let current = std::mem::replace(&mut self.project, previous);
        self.redo_stack.push(current);
        tracing::debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "Undo"
        );
        Ok(self.dirty.mark_dirty())
    }

    /// Re-apply the last undone command. Returns true when the modified flag flipped.
    pub fn redo(&mut self) -> Result<bool, EmptyStack> {
        let next = self
            .redo_stack
            .pop()
            .ok_or(EmptyStack { operation: "redo" })?;
        let current = std::mem::replace(&mut self.project, next);
        self.undo_stack.push(current);
        tracing::debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "Redo"
        );
        Ok(self.dirty.mark_dirty())
    }

    /// Install a project without history (open, new, close).
    ///
    /// The clipboard survives so signals can be copied between projects.
    /// Returns true when the modified flag flipped.
    pub fn reset(&mut self, project: Project) -> bool {
        self.project = project;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.dirty.reset()
    }

    pub fn start_save(&mut self) {
        self.dirty.start_save();
    }

    /// The current project reached its associated file. Returns true when
    /// the modified flag flipped.
    pub fn mark_saved(&mut self) -> bool {
        self.dirty.save_complete()
    }

    pub fn save_failed(&mut self) {
        self.dirty.save_failed();
    }
}

/// Reject an edit that introduces an invariant violation the project did
/// not already have. Pre-existing problems are left to the validator.
fn check_new_violations(
    before: &Project,
    after: &Project,
    checks_signals: bool,
) -> Result<(), CommandError> {
    let (old, new) = if checks_signals {
        (before.invariant_violations(), after.invariant_violations())
    } else {
        (before.structural_violations(), after.structural_violations())
    };
    match new.into_iter().find(|violation| !old.contains(violation)) {
        Some(violation) => Err(violation.into()),
        None => Ok(()),
    }
}
