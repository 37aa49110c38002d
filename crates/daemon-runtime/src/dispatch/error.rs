//! Errors surfaced by request dispatch.

use kb_01_system_identity::IdentityError;
use kb_02_dataset_unlock::UnlockError;
use kb_03_recovery_config::RecoveryConfigError;
use kb_04_pool_create::PoolCreateError;
use kb_05_recovery_session::RecoverySessionError;
use shared_types::{Classified, CommandTag, EnvelopeError, ErrorKind, TemplateDecodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unable to retrieve command value")]
    UnreadableCommand(#[source] EnvelopeError),

    #[error("Invalid command value {0}")]
    UnknownCommand(i32),

    #[error("invalid {command} request")]
    Field {
        command: CommandTag,
        #[source]
        source: EnvelopeError,
    },

    #[error(transparent)]
    Template(#[from] TemplateDecodeError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Unlock(#[from] UnlockError),

    #[error(transparent)]
    RecoveryConfig(#[from] RecoveryConfigError),

    #[error(transparent)]
    PoolCreate(#[from] PoolCreateError),

    #[error(transparent)]
    RecoverySession(#[from] RecoverySessionError),
}

impl Classified for DispatchError {
    fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnreadableCommand(_) | DispatchError::UnknownCommand(_) => {
                ErrorKind::InvalidCommand
            }
            DispatchError::Field { .. } => ErrorKind::ParameterError,
            DispatchError::Template(e) => e.kind(),
            DispatchError::Identity(e) => e.kind(),
            DispatchError::Unlock(e) => e.kind(),
            DispatchError::RecoveryConfig(e) => e.kind(),
            DispatchError::PoolCreate(e) => e.kind(),
            DispatchError::RecoverySession(e) => e.kind(),
        }
    }

    fn errno(&self) -> Option<i32> {
        match self {
            DispatchError::Identity(e) => e.errno(),
            DispatchError::Unlock(e) => e.errno(),
            DispatchError::RecoveryConfig(e) => e.errno(),
            DispatchError::PoolCreate(e) => e.errno(),
            DispatchError::RecoverySession(e) => e.errno(),
            _ => None,
        }
    }
}
