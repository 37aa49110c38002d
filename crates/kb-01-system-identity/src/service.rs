//! # System Identity Service
//!
//! Application service implementing [`SystemIdentityApi`].

use crate::domain::errors::IdentityError;
use crate::domain::identity::{IdentityChange, IdentityStore, SystemIdentity};
use crate::ports::inbound::SystemIdentityApi;
use crate::ports::outbound::TokenDirectory;
use shared_storage::StorageHandle;
use shared_types::{validate_pool_name, Guid};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SystemIdentityService<D: TokenDirectory + ?Sized> {
    identity: Arc<IdentityStore>,
    storage: Arc<StorageHandle>,
    tokens: Arc<D>,
}

impl<D: TokenDirectory + ?Sized> SystemIdentityService<D> {
    pub fn new(identity: Arc<IdentityStore>, storage: Arc<StorageHandle>, tokens: Arc<D>) -> Self {
        Self {
            identity,
            storage,
            tokens,
        }
    }
}

impl<D: TokenDirectory + ?Sized> SystemIdentityApi for SystemIdentityService<D> {
    fn set_system_token(&self, guid: &[u8]) -> Result<IdentityChange<Guid>, IdentityError> {
        let guid = Guid::from_slice(guid)?;

        let mut identity = self.identity.lock();
        if identity.is_active_token(&guid) {
            debug!(guid = %guid, "system token unchanged");
            return Ok(IdentityChange::Unchanged);
        }

        // Lookup runs under the identity lock; on failure the guard drops
        // with the identity untouched.
        let token = self.tokens.find_by_guid(&guid)?;
        let previous = identity.replace_token(token).map(|t| t.guid);
        info!(guid = %guid, previous = ?previous, "system token set");
        Ok(IdentityChange::Replaced { previous })
    }

    fn set_system_pool(&self, pool: &str) -> Result<IdentityChange<String>, IdentityError> {
        validate_pool_name(pool).map_err(|source| IdentityError::InvalidPoolName {
            pool: pool.to_owned(),
            source,
        })?;

        if !self.storage.pool_exists(pool)? {
            return Err(IdentityError::PoolNotFound {
                pool: pool.to_owned(),
            });
        }

        let mut identity = self.identity.lock();
        if identity.is_system_pool(pool) {
            debug!(pool, "system pool unchanged");
            return Ok(IdentityChange::Unchanged);
        }
        let previous = identity.replace_pool(pool.to_owned());
        info!(pool, previous = ?previous, "system pool set");
        Ok(IdentityChange::Replaced { previous })
    }

    fn system_identity(&self) -> SystemIdentity {
        self.identity.snapshot()
    }
}
