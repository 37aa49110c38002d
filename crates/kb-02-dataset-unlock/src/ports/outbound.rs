//! # Outbound Ports
//!
//! Recovery boxes hold a dataset's wrapping key sealed to one or more
//! tokens. The box format and its cryptography live behind these traits.

use shared_types::{Classified, ErrorKind, RecoveredKey, RecoveryBox, Token};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryBoxError {
    #[error("no recovery box for '{owner}'")]
    NotFound { owner: String },

    #[error("recovery box for '{owner}' is corrupt: {reason}")]
    Corrupt { owner: String, reason: String },

    #[error("no available token can open the recovery box for '{owner}'")]
    NoUsableToken { owner: String },

    #[error("token operation failed: {reason}")]
    Token { reason: String },
}

impl Classified for RecoveryBoxError {
    fn kind(&self) -> ErrorKind {
        match self {
            RecoveryBoxError::Token { .. } => ErrorKind::TokenError,
            _ => ErrorKind::RecoveryBoxError,
        }
    }
}

/// Where recovery boxes are kept (a dataset property in production).
pub trait RecoveryBoxStore: Send + Sync {
    /// Fetch the box for `owner`. With `create_if_missing`, a missing box is
    /// created empty instead of failing.
    fn get_recovery_box(
        &self,
        owner: &str,
        create_if_missing: bool,
    ) -> Result<RecoveryBox, RecoveryBoxError>;
}

/// Opens a recovery box.
pub trait RecoveryBoxUnlocker: Send + Sync {
    /// Open `rbox`, trying `active` first. Returns the raw key and the
    /// token that released it.
    fn unlock(
        &self,
        rbox: &RecoveryBox,
        active: Option<&Token>,
    ) -> Result<RecoveredKey, RecoveryBoxError>;
}
