//! # Recovery Session Errors

use crate::ports::outbound::ChallengeError;
use kb_02_dataset_unlock::RecoveryBoxError;
use shared_storage::StorageError;
use shared_types::{Classified, ErrorKind, Pid};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecoverySessionError {
    #[error("no system pool has been designated")]
    NoSystemPool,

    #[error("recovery already in progress (pid {owner})")]
    InProgress { owner: Pid },

    #[error("no recovery in progress for pid {pid}")]
    NoSession { pid: Pid },

    #[error("system pool changed from {pool} during recovery")]
    PoolChanged { pool: String },

    #[error("unable to fetch recovery box for {pool}")]
    RecoveryBox {
        pool: String,
        #[source]
        source: RecoveryBoxError,
    },

    #[error("recovery challenge failed")]
    Challenge(#[source] ChallengeError),

    #[error("unable to load recovered key for {pool}")]
    KeyLoad {
        pool: String,
        #[source]
        source: StorageError,
    },
}

impl Classified for RecoverySessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            RecoverySessionError::NoSystemPool => ErrorKind::ArgumentError,
            RecoverySessionError::InProgress { .. }
            | RecoverySessionError::NoSession { .. }
            | RecoverySessionError::PoolChanged { .. } => ErrorKind::RecoveryError,
            RecoverySessionError::RecoveryBox { source, .. } => source.kind(),
            RecoverySessionError::Challenge(e) => e.kind(),
            RecoverySessionError::KeyLoad { source, .. } => source.kind(),
        }
    }

    fn errno(&self) -> Option<i32> {
        match self {
            RecoverySessionError::KeyLoad { source, .. } => source.errno(),
            _ => None,
        }
    }
}
