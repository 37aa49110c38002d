//! # Inbound Ports

use crate::domain::decision::UnlockOutcome;
use crate::domain::errors::UnlockError;

/// Dataset unlock API.
pub trait DatasetUnlockApi: Send + Sync {
    /// Recover `dataset`'s key and load it.
    ///
    /// # Errors
    /// * `UnlockError::NotEncrypted` - nothing to unlock
    /// * `UnlockError::AlreadyUnlocked` - the key is already loaded
    /// * any collaborator failure, annotated with the dataset name
    fn unlock_dataset(&self, dataset: &str) -> Result<UnlockOutcome, UnlockError>;
}
