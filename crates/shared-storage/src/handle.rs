//! The storage-handle lock.

use crate::error::StorageError;
use crate::ports::{DatasetStatus, StorageBackend};
use parking_lot::Mutex;
use tracing::trace;

/// Process-wide owner of the volume-manager handle.
pub struct StorageHandle {
    backend: Mutex<Box<dyn StorageBackend>>,
}

impl StorageHandle {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    pub fn pool_exists(&self, pool: &str) -> Result<bool, StorageError> {
        let exists = self.backend.lock().pool_exists(pool)?;
        trace!(pool, exists, "pool existence");
        Ok(exists)
    }

    pub fn dataset_status(&self, dataset: &str) -> Result<DatasetStatus, StorageError> {
        let status = self.backend.lock().dataset_status(dataset)?;
        trace!(
            dataset,
            encrypted = status.encrypted,
            locked = status.locked,
            "dataset status"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// Records how many queries overlap.
    struct OverlapBackend {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl OverlapBackend {
        fn enter(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl StorageBackend for OverlapBackend {
        fn pool_exists(&mut self, _pool: &str) -> Result<bool, StorageError> {
            self.enter();
            Ok(true)
        }

        fn dataset_status(&mut self, _dataset: &str) -> Result<DatasetStatus, StorageError> {
            self.enter();
            Ok(DatasetStatus::UNENCRYPTED)
        }
    }

    #[test]
    fn test_queries_never_overlap() {
        let peak = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(StorageHandle::new(OverlapBackend {
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
        }));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    for _ in 0..5 {
                        if i % 2 == 0 {
                            handle.pool_exists("tank").unwrap();
                        } else {
                            handle.dataset_status("tank/a").unwrap();
                        }
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
