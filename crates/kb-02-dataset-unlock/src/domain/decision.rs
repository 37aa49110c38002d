//! What to do with a dataset given its status.

use shared_storage::{DatasetStatus, KeyLoadOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockDecision {
    NotEncrypted,
    AlreadyUnlocked,
    Unlock,
}

impl From<DatasetStatus> for UnlockDecision {
    fn from(status: DatasetStatus) -> Self {
        match (status.encrypted, status.locked) {
            (false, _) => UnlockDecision::NotEncrypted,
            (true, false) => UnlockDecision::AlreadyUnlocked,
            (true, true) => UnlockDecision::Unlock,
        }
    }
}

/// Successful unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    KeyLoaded,
    /// The key was loaded by someone else between the status check and the
    /// load.
    KeyAlreadyLoaded,
}

impl From<KeyLoadOutcome> for UnlockOutcome {
    fn from(outcome: KeyLoadOutcome) -> Self {
        match outcome {
            KeyLoadOutcome::Loaded => UnlockOutcome::KeyLoaded,
            KeyLoadOutcome::AlreadyLoaded => UnlockOutcome::KeyAlreadyLoaded,
        }
    }
}
