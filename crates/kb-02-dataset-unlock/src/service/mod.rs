//! # Dataset Unlock Service
//!
//! Application service implementing [`DatasetUnlockApi`].

use crate::domain::decision::{UnlockDecision, UnlockOutcome};
use crate::domain::errors::UnlockError;
use crate::ports::inbound::DatasetUnlockApi;
use crate::ports::outbound::{RecoveryBoxStore, RecoveryBoxUnlocker};
use kb_01_system_identity::IdentityStore;
use shared_storage::{KeyLoader, StorageHandle};
use shared_types::validate_dataset_name;
use std::sync::Arc;
use tracing::{debug, info, trace};


pub struct DatasetUnlockService<S, U, K>
where
    S: RecoveryBoxStore + ?Sized,
    U: RecoveryBoxUnlocker + ?Sized,
    K: KeyLoader + ?Sized,
{
    identity: Arc<IdentityStore>,
    storage: Arc<StorageHandle>,
    boxes: Arc<S>,
    unlocker: Arc<U>,
    keys: Arc<K>,
}

impl<S, U, K> DatasetUnlockService<S, U, K>
where
    S: RecoveryBoxStore + ?Sized,
    U: RecoveryBoxUnlocker + ?Sized,
    K: KeyLoader + ?Sized,
{
    pub fn new(
        identity: Arc<IdentityStore>,
        storage: Arc<StorageHandle>,
        boxes: Arc<S>,
        unlocker: Arc<U>,
        keys: Arc<K>,
    ) -> Self {
        Self {
            identity,
            storage,
            boxes,
            unlocker,
            keys,
        }
    }
}

impl<S, U, K> DatasetUnlockApi for DatasetUnlockService<S, U, K>
where
    S: RecoveryBoxStore + ?Sized,
    U: RecoveryBoxUnlocker + ?Sized,
    K: KeyLoader + ?Sized,
{
    fn unlock_dataset(&self, dataset: &str) -> Result<UnlockOutcome, UnlockError> {
        let owned = || dataset.to_owned();
        validate_dataset_name(dataset).map_err(|source| UnlockError::InvalidDataset {
            dataset: owned(),
            source,
        })?;

        let identity = self.identity.lock();

        let status = self
            .storage
            .dataset_status(dataset)
            .map_err(|source| UnlockError::Status {
                dataset: owned(),
                source,
            })?;
        trace!(
            dataset,
            encrypted = status.encrypted,
            locked = status.locked,
            "unlock status"
        );

        match UnlockDecision::from(status) {
            UnlockDecision::NotEncrypted => {
                return Err(UnlockError::NotEncrypted { dataset: owned() })
            }
            UnlockDecision::AlreadyUnlocked => {
                return Err(UnlockError::AlreadyUnlocked { dataset: owned() })
            }
            UnlockDecision::Unlock => {}
        }

        let rbox = self
            .boxes
            .get_recovery_box(dataset, false)
            .map_err(|source| UnlockError::BoxFetch {
                dataset: owned(),
                source,
            })?;

        let recovered = self
            .unlocker
            .unlock(&rbox, identity.token.as_ref())
            .map_err(|source| UnlockError::BoxUnlock {
                dataset: owned(),
                source,
            })?;
        if let Some(token) = &recovered.token {
            debug!(dataset, guid = %token.guid, "recovery box opened");
        }

        let outcome = self
            .keys
            .load_key(dataset, recovered.key())
            .map_err(|source| UnlockError::KeyLoad {
                dataset: owned(),
                source,
            })?;
        drop(identity);

        let outcome = UnlockOutcome::from(outcome);
        info!(dataset, ?outcome, "dataset unlocked");
        Ok(outcome)
    }
}
