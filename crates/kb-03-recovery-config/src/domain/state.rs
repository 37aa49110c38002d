//! Staged and effective templates.

use shared_types::RecoveryTemplate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryState {
    pub effective: Option<RecoveryTemplate>,
    pub staged: Option<RecoveryTemplate>,
}

impl RecoveryState {
    /// Put `template` in the staged slot. Returns whether something was
    /// already staged.
    pub fn stage(&mut self, template: RecoveryTemplate) -> bool {
        self.staged.replace(template).is_some()
    }

    pub fn discard_staged(&mut self) -> bool {
        self.staged.take().is_some()
    }

    /// Move the staged template to effective.
    pub fn promote(&mut self) -> bool {
        match self.staged.take() {
            Some(template) => {
                self.effective = Some(template);
                true
            }
            None => false,
        }
    }

    pub fn listing(&self) -> RecoveryListing {
        RecoveryListing {
            staged: self.staged.is_some(),
            effective: self.effective.clone(),
            pending: self.staged.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Staged { replaced: bool },
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activated,
    NothingStaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    Discarded,
    NothingStaged,
}

/// What `ListRecovery` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryListing {
    pub staged: bool,
    pub effective: Option<RecoveryTemplate>,
    pub pending: Option<RecoveryTemplate>,
}
