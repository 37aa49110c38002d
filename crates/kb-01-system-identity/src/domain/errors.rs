//! # Identity Errors

use crate::ports::outbound::TokenLookupError;
use shared_storage::StorageError;
use shared_types::{Classified, ErrorKind, GuidLengthError, NameError};
use thiserror::Error;

/// Errors from setting the system token or pool.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The supplied GUID is not `GUID_LEN` bytes.
    #[error("invalid token GUID")]
    GuidLength(#[from] GuidLengthError),

    #[error("'{pool}' is not a valid pool name")]
    InvalidPoolName {
        pool: String,
        #[source]
        source: NameError,
    },

    #[error("pool '{pool}' does not exist")]
    PoolNotFound { pool: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    TokenLookup(#[from] TokenLookupError),
}

impl Classified for IdentityError {
    fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::GuidLength(_) | IdentityError::InvalidPoolName { .. } => {
                ErrorKind::ParameterError
            }
            IdentityError::PoolNotFound { .. } => ErrorKind::NotFoundError,
            IdentityError::Storage(e) => e.kind(),
            IdentityError::TokenLookup(e) => e.kind(),
        }
    }

    fn errno(&self) -> Option<i32> {
        match self {
            IdentityError::Storage(e) => e.errno(),
            _ => None,
        }
    }
}
