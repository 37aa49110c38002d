//! # Inbound Ports

use crate::domain::errors::IdentityError;
use crate::domain::identity::{IdentityChange, SystemIdentity};
use shared_types::Guid;

/// System identity API.
pub trait SystemIdentityApi: Send + Sync {
    /// Designate the token with this GUID as the system token.
    ///
    /// # Errors
    /// * `IdentityError::GuidLength` - `guid` is not `GUID_LEN` bytes
    /// * `IdentityError::TokenLookup` - the token could not be found
    fn set_system_token(&self, guid: &[u8]) -> Result<IdentityChange<Guid>, IdentityError>;

    /// Designate `pool` as the system pool.
    ///
    /// # Errors
    /// * `IdentityError::InvalidPoolName` - bad pool-name syntax
    /// * `IdentityError::Storage` - the existence query failed
    /// * `IdentityError::PoolNotFound` - the pool does not exist
    fn set_system_pool(&self, pool: &str) -> Result<IdentityChange<String>, IdentityError>;

    fn system_identity(&self) -> SystemIdentity;
}
