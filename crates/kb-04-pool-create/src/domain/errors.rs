//! # Pool Creation Errors

use crate::ports::outbound::ProvisionError;
use shared_types::{Classified, ErrorKind, GuidLengthError, NameError, TemplateDecodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolCreateError {
    #[error("Bad guid length ({})", .0.actual)]
    InvalidGuid(#[from] GuidLengthError),

    #[error("'{dataset}' is not a valid dataset name")]
    InvalidDataset {
        dataset: String,
        #[source]
        source: NameError,
    },

    #[error(transparent)]
    Template(#[from] TemplateDecodeError),

    #[error("pool creation failed")]
    Provisioning(#[source] ProvisionError),
}

impl Classified for PoolCreateError {
    fn kind(&self) -> ErrorKind {
        match self {
            PoolCreateError::InvalidGuid(_) => ErrorKind::InvalidGUID,
            PoolCreateError::InvalidDataset { .. } => ErrorKind::ParameterError,
            PoolCreateError::Template(e) => e.kind(),
            PoolCreateError::Provisioning(e) => e.kind(),
        }
    }
}
