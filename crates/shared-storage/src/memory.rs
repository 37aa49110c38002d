//! # In-Memory Storage
//!
//! A volume manager held entirely in memory. Used by tests and by the
//! daemon's `memory` backend. Clones share state, so a test can keep one
//! clone for inspection while the services own another.

use crate::error::{errno, StorageError, SystemError};
use crate::ports::{DatasetStatus, KeyLoadOutcome, KeyLoader, StorageBackend};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A dataset known to the in-memory backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDataset {
    pub encrypted: bool,
    pub key_loaded: bool,
    /// When set, only this key loads.
    pub expected_key: Option<Vec<u8>>,
    /// The last key loaded.
    pub loaded_key: Option<Vec<u8>>,
}

impl MemoryDataset {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn locked() -> Self {
        Self {
            encrypted: true,
            ..Self::default()
        }
    }

    pub fn unlocked() -> Self {
        Self {
            encrypted: true,
            key_loaded: true,
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.expected_key = Some(key.into());
        self
    }
}

#[derive(Default)]
struct MemoryState {
    pools: HashSet<String>,
    datasets: HashMap<String, MemoryDataset>,
    pool_query_failure: Option<SystemError>,
    status_failure: Option<SystemError>,
    load_failure: Option<SystemError>,
    /// Report the next load as already done by another consumer.
    preempt_next_load: bool,
    status_calls: usize,
    load_calls: usize,
}

/// In-memory [`StorageBackend`] and [`KeyLoader`].
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Setup
    // =========================================================================

    pub fn add_pool(&self, pool: impl Into<String>) {
        self.state.lock().pools.insert(pool.into());
    }

    pub fn add_dataset(&self, name: impl Into<String>, dataset: MemoryDataset) {
        self.state.lock().datasets.insert(name.into(), dataset);
    }

    pub fn fail_pool_queries(&self, error: Option<SystemError>) {
        self.state.lock().pool_query_failure = error;
    }

    pub fn fail_status_queries(&self, error: Option<SystemError>) {
        self.state.lock().status_failure = error;
    }

    pub fn fail_key_loads(&self, error: Option<SystemError>) {
        self.state.lock().load_failure = error;
    }

    /// Make the next load find the key already present, as if another
    /// consumer loaded it between the status check and the load.
    pub fn preempt_next_load(&self) {
        self.state.lock().preempt_next_load = true;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn dataset(&self, name: &str) -> Option<MemoryDataset> {
        self.state.lock().datasets.get(name).cloned()
    }

    pub fn is_key_loaded(&self, name: &str) -> bool {
        self.dataset(name).is_some_and(|d| d.key_loaded)
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().status_calls
    }

    pub fn load_calls(&self) -> usize {
        self.state.lock().load_calls
    }
}

impl StorageBackend for MemoryStorage {
    fn pool_exists(&mut self, pool: &str) -> Result<bool, StorageError> {
        let state = self.state.lock();
        if let Some(source) = state.pool_query_failure.clone() {
            return Err(StorageError::PoolQuery {
                pool: pool.to_owned(),
                source,
            });
        }
        Ok(state.pools.contains(pool))
    }

    fn dataset_status(&mut self, dataset: &str) -> Result<DatasetStatus, StorageError> {
        let mut state = self.state.lock();
        state.status_calls += 1;
        if let Some(source) = state.status_failure.clone() {
            return Err(StorageError::DatasetOpen {
                dataset: dataset.to_owned(),
                source,
            });
        }
        let ds = state
            .datasets
            .get(dataset)
            .ok_or_else(|| StorageError::DatasetOpen {
                dataset: dataset.to_owned(),
                source: SystemError::new("zfs_open", Some(errno::ENOENT), "dataset does not exist"),
            })?;
        Ok(if ds.encrypted {
            DatasetStatus::encrypted(!ds.key_loaded)
        } else {
            DatasetStatus::UNENCRYPTED
        })
    }
}

impl KeyLoader for MemoryStorage {
    fn load_key(&self, dataset: &str, key: &[u8]) -> Result<KeyLoadOutcome, StorageError> {
        let mut state = self.state.lock();
        state.load_calls += 1;
        let fail = |code, message: &str| StorageError::KeyLoad {
            dataset: dataset.to_owned(),
            source: SystemError::new("zfs_crypto_load_key", Some(code), message),
        };
        if let Some(source) = state.load_failure.clone() {
            return Err(StorageError::KeyLoad {
                dataset: dataset.to_owned(),
                source,
            });
        }
        let preempted = std::mem::take(&mut state.preempt_next_load);
        let ds = state
            .datasets
            .get_mut(dataset)
            .ok_or_else(|| fail(errno::ENOENT, "dataset does not exist"))?;
        if !ds.encrypted {
            return Err(fail(errno::EINVAL, "dataset is not encrypted"));
        }
        if ds.key_loaded || preempted {
            ds.key_loaded = true;
            return Ok(KeyLoadOutcome::AlreadyLoaded);
        }
        if ds.expected_key.as_deref().is_some_and(|expected| expected != key) {
            return Err(fail(errno::EACCES, "incorrect key provided"));
        }
        ds.key_loaded = true;
        ds.loaded_key = Some(key.to_vec());
        Ok(KeyLoadOutcome::Loaded)
    }
}
