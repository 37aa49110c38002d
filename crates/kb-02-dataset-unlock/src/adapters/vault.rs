//! # In-Memory Recovery Vault
//!
//! Stores recovery boxes in memory and opens them with tokens from a
//! [`TokenDirectory`]. Boxes are sealed in the clear: the payload is the
//! owning token's GUID followed by the raw key. Intended for tests and the
//! development backend only.

use crate::ports::outbound::{RecoveryBoxError, RecoveryBoxStore, RecoveryBoxUnlocker};
use kb_01_system_identity::{TokenDirectory, TokenLookupError};
use parking_lot::{Mutex, RwLock};
use shared_types::{Guid, RecoveredKey, RecoveryBox, Token, GUID_LEN};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

pub struct MemoryRecoveryVault {
    boxes: RwLock<HashMap<String, RecoveryBox>>,
    tokens: Arc<dyn TokenDirectory>,
    unlock_delay: Mutex<Option<Duration>>,
    unlocks: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryRecoveryVault {
    pub fn new(tokens: Arc<dyn TokenDirectory>) -> Self {
        Self {
            boxes: RwLock::new(HashMap::new()),
            tokens,
            unlock_delay: Mutex::new(None),
            unlocks: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Build a box for `owner` holding `key`, openable by `guid`.
    pub fn seal_plain(owner: impl Into<String>, guid: &Guid, key: &[u8]) -> RecoveryBox {
        let mut payload = Vec::with_capacity(GUID_LEN + key.len());
        payload.extend_from_slice(guid.as_bytes());
        payload.extend_from_slice(key);
        RecoveryBox::new(owner, payload)
    }

    fn open_plain(rbox: &RecoveryBox) -> Result<(Guid, &[u8]), RecoveryBoxError> {
        let corrupt = |reason: &str| RecoveryBoxError::Corrupt {
            owner: rbox.owner.clone(),
            reason: reason.to_owned(),
        };
        if rbox.payload.len() <= GUID_LEN {
            return Err(corrupt("box holds no key"));
        }
        let (guid, key) = rbox.payload.split_at(GUID_LEN);
        let guid = Guid::from_slice(guid).map_err(|e| corrupt(&e.to_string()))?;
        Ok((guid, key))
    }

    pub fn insert(&self, rbox: RecoveryBox) {
        self.boxes.write().insert(rbox.owner.clone(), rbox);
    }

    pub fn seal(&self, owner: &str, guid: &Guid, key: &[u8]) {
        self.insert(Self::seal_plain(owner, guid, key));
    }

    pub fn contains(&self, owner: &str) -> bool {
        self.boxes.read().contains_key(owner)
    }

    /// Hold every unlock for `delay`, to widen race windows in tests.
    pub fn set_unlock_delay(&self, delay: Option<Duration>) {
        *self.unlock_delay.lock() = delay;
    }

    pub fn unlocks(&self) -> usize {
        self.unlocks.load(Ordering::SeqCst)
    }

    /// Most unlocks ever observed running at once.
    pub fn peak_concurrent_unlocks(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn resolve_token(&self, owner: &str, guid: &Guid) -> Result<Token, RecoveryBoxError> {
        match self.tokens.find_by_guid(guid) {
            Ok(token) => Ok(token),
            Err(TokenLookupError::NotFound { .. }) => Err(RecoveryBoxError::NoUsableToken {
                owner: owner.to_owned(),
            }),
            Err(TokenLookupError::Unavailable { reason }) => Err(RecoveryBoxError::Token { reason }),
        }
    }
}

impl RecoveryBoxStore for MemoryRecoveryVault {
    fn get_recovery_box(
        &self,
        owner: &str,
        create_if_missing: bool,
    ) -> Result<RecoveryBox, RecoveryBoxError> {
        if let Some(rbox) = self.boxes.read().get(owner) {
            return Ok(rbox.clone());
        }
        if !create_if_missing {
            return Err(RecoveryBoxError::NotFound {
                owner: owner.to_owned(),
            });
        }
        debug!(owner, "creating empty recovery box");
        let rbox = RecoveryBox::new(owner, Vec::new());
        self.insert(rbox.clone());
        Ok(rbox)
    }
}

impl RecoveryBoxUnlocker for MemoryRecoveryVault {
    fn unlock(
        &self,
        rbox: &RecoveryBox,
        active: Option<&Token>,
    ) -> Result<RecoveredKey, RecoveryBoxError> {
        self.unlocks.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = *self.unlock_delay.lock() {
            thread::sleep(delay);
        }
        let result = Self::open_plain(rbox).and_then(|(guid, key)| {
            let token = match active {
                Some(token) if token.guid == guid => token.clone(),
                _ => self.resolve_token(&rbox.owner, &guid)?,
            };
            Ok(RecoveredKey::new(key.to_vec(), Some(token)))
        });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
