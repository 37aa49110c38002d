//! # Recovery Configuration Errors

use crate::ports::outbound::InstallError;
use shared_types::{Classified, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecoveryConfigError {
    #[error("no system pool has been designated")]
    NoSystemPool,

    #[error("unable to install recovery template on pool {pool}")]
    Install {
        pool: String,
        #[source]
        source: InstallError,
    },
}

impl Classified for RecoveryConfigError {
    fn kind(&self) -> ErrorKind {
        match self {
            RecoveryConfigError::NoSystemPool => ErrorKind::ArgumentError,
            RecoveryConfigError::Install { source, .. } => source.kind(),
        }
    }
}
