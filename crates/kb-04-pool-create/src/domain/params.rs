//! Raw and validated pool-creation parameters.

use crate::domain::errors::PoolCreateError;
use shared_types::{validate_dataset_name, Guid, RecoveryTemplate, TemplateDecoder};
use std::fmt;
use zeroize::Zeroizing;

/// Parameters as they arrived, already type-checked but not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolCreateRequest {
    pub dataset: Option<String>,
    pub guid: Option<Vec<u8>>,
    pub template: Option<Vec<u8>>,
    pub recovery_token: Option<Vec<u8>>,
}

impl PoolCreateRequest {
    /// Validate every present field. Checks run in request-field order, so
    /// the first malformed field is the one reported.
    pub fn validate(
        self,
        decoder: &dyn TemplateDecoder,
    ) -> Result<PoolCreateParams, PoolCreateError> {
        if let Some(dataset) = &self.dataset {
            validate_dataset_name(dataset).map_err(|source| PoolCreateError::InvalidDataset {
                dataset: dataset.clone(),
                source,
            })?;
        }
        let guid = self
            .guid
            .as_deref()
            .map(Guid::from_slice)
            .transpose()?;
        let template = self
            .template
            .as_deref()
            .map(|bytes| decoder.decode(bytes))
            .transpose()?;
        Ok(PoolCreateParams {
            dataset: self.dataset,
            guid,
            template,
            recovery_token: self.recovery_token.map(Zeroizing::new),
        })
    }
}

/// Validated parameters handed to the provisioner.
pub struct PoolCreateParams {
    pub dataset: Option<String>,
    pub guid: Option<Guid>,
    pub template: Option<RecoveryTemplate>,
    pub recovery_token: Option<Zeroizing<Vec<u8>>>,
}

impl fmt::Debug for PoolCreateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolCreateParams")
            .field("dataset", &self.dataset)
            .field("guid", &self.guid)
            .field("template", &self.template)
            .field("recovery_token", &self.recovery_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
