//! # Inbound Ports

use crate::domain::errors::PoolCreateError;
use crate::domain::params::PoolCreateRequest;
use crate::ports::outbound::ProvisionedPool;

/// Pool creation API.
pub trait PoolCreateApi: Send + Sync {
    /// Validate `request` and provision the pool.
    fn create_pool(&self, request: PoolCreateRequest) -> Result<ProvisionedPool, PoolCreateError>;
}
