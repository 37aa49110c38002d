//! Recovery boxes and the keys recovered from them.

use crate::token::Token;
use std::fmt;
use zeroize::Zeroizing;

/// Sealed key material bound to a dataset. The payload is opaque to the
/// broker; only the recovery-box collaborator interprets it.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoveryBox {
    pub owner: String,
    pub payload: Vec<u8>,
}

impl RecoveryBox {
    pub fn new(owner: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            owner: owner.into(),
            payload,
        }
    }
}

impl fmt::Debug for RecoveryBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryBox")
            .field("owner", &self.owner)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// A raw wrapping key, wiped on drop, plus the token that released it.
pub struct RecoveredKey {
    key: Zeroizing<Vec<u8>>,
    pub token: Option<Token>,
}

impl RecoveredKey {
    pub fn new(key: Vec<u8>, token: Option<Token>) -> Self {
        Self {
            key: Zeroizing::new(key),
            token,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for RecoveredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveredKey")
            .field("key", &"<redacted>")
            .field("token", &self.token)
            .finish()
    }
}
