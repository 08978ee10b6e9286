/// What to do when the user asks to leave the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Proceed,
    /// Ask "quit anyway?" before leaving.
    Confirm,
}

/// Tracks selection or theme changes not yet settled by a completed fetch.
///
/// Set by category, language and theme changes. Cleared when the latest
/// fetch cycle completes successfully, and on logout.
#[derive(Debug, Default)]
pub struct UnsavedChangesGuard {
    dirty: bool,
}

impl UnsavedChangesGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn reset(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn check_exit(&self) -> ExitDecision {
        if self.dirty {
            ExitDecision::Confirm
        } else {
            ExitDecision::Proceed
        }
    }
}
