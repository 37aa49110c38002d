//! # Outbound Ports

use crate::domain::params::PoolCreateParams;
use shared_types::{Classified, ErrorKind, Guid};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("{reason}")]
    Failed { reason: String },

    #[error("token operation failed: {reason}")]
    Token { reason: String },
}

impl Classified for ProvisionError {
    fn kind(&self) -> ErrorKind {
        match self {
            ProvisionError::Failed { .. } => ErrorKind::ProvisioningError,
            ProvisionError::Token { .. } => ErrorKind::TokenError,
        }
    }
}

/// What the provisioner created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedPool {
    pub pool: String,
    /// Token the new pool's key is sealed to.
    pub token_guid: Option<Guid>,
}

/// Creates an encrypted pool and seals its key.
pub trait PoolProvisioner: Send + Sync {
    fn create_pool(&self, params: &PoolCreateParams) -> Result<ProvisionedPool, ProvisionError>;
}
