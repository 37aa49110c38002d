//! # Storage Ports
//!
//! Production: `ZfsCliBackend` (daemon-runtime/src/adapters/zfs_cli.rs)
//! Testing: [`MemoryStorage`](crate::memory::MemoryStorage)

use crate::error::StorageError;

/// Encryption state of a dataset, read fresh on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetStatus {
    pub encrypted: bool,
    pub locked: bool,
}

impl DatasetStatus {
    /// An unencrypted dataset is never reported as locked.
    pub const UNENCRYPTED: DatasetStatus = DatasetStatus {
        encrypted: false,
        locked: false,
    };

    pub const fn encrypted(locked: bool) -> Self {
        Self {
            encrypted: true,
            locked,
        }
    }
}

/// Result of a successful key load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLoadOutcome {
    Loaded,
    /// Someone else loaded the key first.
    AlreadyLoaded,
}

/// Pool and dataset queries against the volume manager.
///
/// Methods take `&mut self`: the handle is single-threaded and
/// is only reachable through [`StorageHandle`](crate::handle::StorageHandle).
pub trait StorageBackend: Send {
    /// Whether `pool` exists. `Ok(false)` only when the pool is confirmed
    /// absent.
    fn pool_exists(&mut self, pool: &str) -> Result<bool, StorageError>;

    fn dataset_status(&mut self, dataset: &str) -> Result<DatasetStatus, StorageError>;
}

/// Loads a wrapping key into a dataset.
pub trait KeyLoader: Send + Sync {
    fn load_key(&self, dataset: &str, key: &[u8]) -> Result<KeyLoadOutcome, StorageError>;
}
