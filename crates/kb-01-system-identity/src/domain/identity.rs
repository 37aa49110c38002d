//! # System Identity
//!
//! The process-wide record of the designated token and pool, and the lock
//! that guards it.
//!
//! The same lock also serializes dataset unlocks and the recovery
//! configuration lifecycle, so those subsystems hold an `Arc<IdentityStore>`
//! and take [`IdentityStore::lock`] for their whole critical section. The
//! lock is not reentrant.

use parking_lot::{Mutex, MutexGuard};
use shared_types::{Guid, Token};

/// The designated token and pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemIdentity {
    pub token: Option<Token>,
    pub pool: Option<String>,
}

impl SystemIdentity {
    pub fn is_active_token(&self, guid: &Guid) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| t.guid.ct_eq_bytes(guid.as_bytes()))
    }

    pub fn is_system_pool(&self, pool: &str) -> bool {
        self.pool.as_deref() == Some(pool)
    }

    /// Swap in a new token, returning the one it replaces.
    pub fn replace_token(&mut self, token: Token) -> Option<Token> {
        self.token.replace(token)
    }

    /// Swap in a new pool name, returning the one it replaces.
    pub fn replace_pool(&mut self, pool: String) -> Option<String> {
        self.pool.replace(pool)
    }
}

/// Outcome of an identity mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityChange<T> {
    /// The value that was active before, if any.
    Replaced { previous: Option<T> },
    /// The requested value was already active.
    Unchanged,
}

pub type IdentityGuard<'a> = MutexGuard<'a, SystemIdentity>;

/// Owner of the [`SystemIdentity`] singleton.
#[derive(Debug, Default)]
pub struct IdentityStore {
    state: Mutex<SystemIdentity>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(identity: SystemIdentity) -> Self {
        Self {
            state: Mutex::new(identity),
        }
    }

    /// Take the identity lock.
    pub fn lock(&self) -> IdentityGuard<'_> {
        self.state.lock()
    }

    /// Take the identity lock if nobody holds it.
    pub fn try_lock(&self) -> Option<IdentityGuard<'_>> {
        self.state.try_lock()
    }

    /// A consistent copy of the current identity.
    pub fn snapshot(&self) -> SystemIdentity {
        self.state.lock().clone()
    }
}
