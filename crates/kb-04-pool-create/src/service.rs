//! # Pool Creation Service

use crate::domain::errors::PoolCreateError;
use crate::domain::params::PoolCreateRequest;
use crate::ports::inbound::PoolCreateApi;
use crate::ports::outbound::{PoolProvisioner, ProvisionedPool};
use shared_types::TemplateDecoder;
use std::sync::Arc;
use tracing::info;

pub struct PoolCreateService<P: PoolProvisioner + ?Sized> {
    provisioner: Arc<P>,
    decoder: Arc<dyn TemplateDecoder>,
}

impl<P: PoolProvisioner + ?Sized> PoolCreateService<P> {
    pub fn new(provisioner: Arc<P>, decoder: Arc<dyn TemplateDecoder>) -> Self {
        Self {
            provisioner,
            decoder,
        }
    }
}

impl<P: PoolProvisioner + ?Sized> PoolCreateApi for PoolCreateService<P> {
    fn create_pool(&self, request: PoolCreateRequest) -> Result<ProvisionedPool, PoolCreateError> {
        let params = request.validate(self.decoder.as_ref())?;
        let created = self
            .provisioner
            .create_pool(&params)
            .map_err(PoolCreateError::Provisioning)?;
        info!(
            pool = %created.pool,
            guid = ?created.token_guid,
            "pool created"
        );
        Ok(created)
    }
}
