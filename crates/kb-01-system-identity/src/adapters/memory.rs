//! In-memory token directory.

use crate::ports::outbound::{TokenDirectory, TokenLookupError};
use parking_lot::RwLock;
use shared_types::{Guid, Token};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tokens registered by hand, for tests and the development backend.
#[derive(Default)]
pub struct MemoryTokenDirectory {
    tokens: RwLock<HashMap<Guid, Token>>,
    outage: RwLock<Option<String>>,
    lookups: AtomicUsize,
}

impl MemoryTokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let directory = Self::new();
        for token in tokens {
            directory.insert(token);
        }
        directory
    }

    pub fn insert(&self, token: Token) {
        self.tokens.write().insert(token.guid, token);
    }

    pub fn remove(&self, guid: &Guid) -> Option<Token> {
        self.tokens.write().remove(guid)
    }

    /// Make every lookup fail with `Unavailable` until cleared.
    pub fn set_outage(&self, reason: Option<String>) {
        *self.outage.write() = reason;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl TokenDirectory for MemoryTokenDirectory {
    fn find_by_guid(&self, guid: &Guid) -> Result<Token, TokenLookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.outage.read().clone() {
            return Err(TokenLookupError::Unavailable { reason });
        }
        self.tokens
            .read()
            .get(guid)
            .cloned()
            .ok_or(TokenLookupError::NotFound { guid: *guid })
    }
}
