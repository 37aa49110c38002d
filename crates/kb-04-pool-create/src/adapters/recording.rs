//! Provisioner that records each call and answers with a fixed pool.

use crate::domain::params::PoolCreateParams;
use crate::ports::outbound::{PoolProvisioner, ProvisionError, ProvisionedPool};
use parking_lot::Mutex;
use shared_types::Guid;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Records the dataset and GUID of every request.
pub struct RecordingProvisioner {
    default_pool: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Option<String>, Option<Guid>)>>,
    failure: Mutex<Option<ProvisionError>>,
}

impl RecordingProvisioner {
    pub fn new(default_pool: impl Into<String>) -> Self {
        Self {
            default_pool: default_pool.into(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, error: Option<ProvisionError>) {
        *self.failure.lock() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(Option<String>, Option<Guid>)> {
        self.seen.lock().clone()
    }
}

impl PoolProvisioner for RecordingProvisioner {
    fn create_pool(&self, params: &PoolCreateParams) -> Result<ProvisionedPool, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push((params.dataset.clone(), params.guid));
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        Ok(ProvisionedPool {
            pool: params
                .dataset
                .clone()
                .unwrap_or_else(|| self.default_pool.clone()),
            token_guid: params.guid,
        })
    }
}
