//! # Outbound Ports

use shared_types::{Classified, ErrorKind, Guid, Token};
use thiserror::Error;

/// Error from the token layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenLookupError {
    #[error("no token with GUID {guid} is present")]
    NotFound { guid: Guid },

    #[error("token layer unavailable: {reason}")]
    Unavailable { reason: String },
}

impl Classified for TokenLookupError {
    fn kind(&self) -> ErrorKind {
        match self {
            TokenLookupError::NotFound { .. } => ErrorKind::NotFoundError,
            TokenLookupError::Unavailable { .. } => ErrorKind::TokenError,
        }
    }
}

/// Directory of attached tokens.
///
/// Production: the PIV layer, which enumerates readers.
/// Testing: `MemoryTokenDirectory`.
pub trait TokenDirectory: Send + Sync {
    fn find_by_guid(&self, guid: &Guid) -> Result<Token, TokenLookupError>;
}
