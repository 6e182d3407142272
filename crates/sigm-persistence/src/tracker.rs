//! Modified-state tracking.

/// Tracks unsaved changes in a project.
///
/// Backs the "modified" indicator. Transition methods return `true` when
/// the flag actually flipped, so callers notify observers only on change.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    /// Whether there are unsaved changes.
    dirty: bool,

    /// Whether a save is currently in progress.
    saving: bool,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self {
            dirty: false,
            saving: false,
        }
    }

    /// Check if there are unsaved changes.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if a save is in progress.
    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Record a mutation.
    pub fn mark_dirty(&mut self) -> bool {
        let flipped = !self.dirty;
        self.dirty = true;
        flipped
    }

    /// Mark that a save has started.
    pub fn start_save(&mut self) {
        self.saving = true;
    }

    /// Mark that a save has completed successfully.
    pub fn save_complete(&mut self) -> bool {
        self.saving = false;
        self.reset()
    }

    /// Mark that a save has failed. The dirty flag is left alone.
    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    /// Forget all changes (new project, close).
    pub fn reset(&mut self) -> bool {
        let flipped = self.dirty;
        self.dirty = false;
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_clean() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_saving());
    }

    #[test]
    fn test_mark_dirty_reports_first_flip_only() {
        let mut tracker = DirtyTracker::new();
        assert!(tracker.mark_dirty());
        assert!(!tracker.mark_dirty());
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_save_complete() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty();
        tracker.start_save();
        assert!(tracker.is_saving());

        assert!(tracker.save_complete());
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_saving());
    }

    #[test]
    fn test_save_failed() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty();
        tracker.start_save();
        tracker.save_failed();

        assert!(tracker.is_dirty());
        assert!(!tracker.is_saving());
    }

    #[test]
    fn test_reset_on_clean_tracker_is_silent() {
        let mut tracker = DirtyTracker::new();
        assert!(!tracker.reset());
    }
}
