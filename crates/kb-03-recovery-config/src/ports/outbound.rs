//! # Outbound Ports

use shared_types::{Classified, ErrorKind, RecoveryTemplate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("recovery box could not be re-sealed: {reason}")]
    Seal { reason: String },

    #[error("token operation failed: {reason}")]
    Token { reason: String },
}

impl Classified for InstallError {
    fn kind(&self) -> ErrorKind {
        match self {
            InstallError::Seal { .. } => ErrorKind::RecoveryBoxError,
            InstallError::Token { .. } => ErrorKind::TokenError,
        }
    }
}

/// Re-seals a pool's recovery box under a new template.
pub trait TemplateInstaller: Send + Sync {
    fn install(&self, pool: &str, template: &RecoveryTemplate) -> Result<(), InstallError>;
}
