//! # Unlock Errors

use crate::ports::outbound::RecoveryBoxError;
use shared_storage::StorageError;
use shared_types::{Classified, ErrorKind, NameError};
use thiserror::Error;

/// Errors from unlocking a dataset. Every variant names the dataset.
#[derive(Debug, Error)]
pub enum UnlockError {
    #[error("'{dataset}' is not a valid dataset name")]
    InvalidDataset {
        dataset: String,
        #[source]
        source: NameError,
    },

    #[error("dataset {dataset} does not appear to be encrypted")]
    NotEncrypted { dataset: String },

    #[error("dataset {dataset}'s key is already loaded")]
    AlreadyUnlocked { dataset: String },

    #[error("unable to determine encryption status of {dataset}")]
    Status {
        dataset: String,
        #[source]
        source: StorageError,
    },

    #[error("unable to fetch recovery box for {dataset}")]
    BoxFetch {
        dataset: String,
        #[source]
        source: RecoveryBoxError,
    },

    #[error("unable to unlock recovery box for {dataset}")]
    BoxUnlock {
        dataset: String,
        #[source]
        source: RecoveryBoxError,
    },

    #[error("unable to load key for {dataset}")]
    KeyLoad {
        dataset: String,
        #[source]
        source: StorageError,
    },
}

impl UnlockError {
    pub fn dataset(&self) -> &str {
        match self {
            UnlockError::InvalidDataset { dataset, .. }
            | UnlockError::NotEncrypted { dataset }
            | UnlockError::AlreadyUnlocked { dataset }
            | UnlockError::Status { dataset, .. }
            | UnlockError::BoxFetch { dataset, .. }
            | UnlockError::BoxUnlock { dataset, .. }
            | UnlockError::KeyLoad { dataset, .. } => dataset,
        }
    }
}

impl Classified for UnlockError {
    fn kind(&self) -> ErrorKind {
        match self {
            UnlockError::InvalidDataset { .. } => ErrorKind::ParameterError,
            UnlockError::NotEncrypted { .. } => ErrorKind::ArgumentError,
            UnlockError::AlreadyUnlocked { .. } => ErrorKind::AlreadyUnlocked,
            UnlockError::Status { source, .. } | UnlockError::KeyLoad { source, .. } => {
                source.kind()
            }
            UnlockError::BoxFetch { source, .. } | UnlockError::BoxUnlock { source, .. } => {
                source.kind()
            }
        }
    }

    fn errno(&self) -> Option<i32> {
        match self {
            UnlockError::Status { source, .. } | UnlockError::KeyLoad { source, .. } => {
                source.errno()
            }
            _ => None,
        }
    }
}
