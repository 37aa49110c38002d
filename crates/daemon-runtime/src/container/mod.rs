//! # Dependency Injection Container
//!
//! Owns the process-wide state (identity store, storage handle) and builds
//! every subsystem service over one [`Backends`] bundle.
//!
//! ## Lock Order
//!
//! ```text
//! identity lock ──→ storage-handle lock
//!       │
//!       ├──→ recovery state mutex
//!       └──→ recovery session mutex
//! ```

pub mod config;

pub use config::{ConfigError, DaemonConfig, StorageBackendKind};

use kb_01_system_identity::{
    IdentityStore, MemoryTokenDirectory, SystemIdentityApi, SystemIdentityService, TokenDirectory,
};
use kb_02_dataset_unlock::{
    DatasetUnlockApi, DatasetUnlockService, MemoryRecoveryVault, RecoveryBoxStore,
    RecoveryBoxUnlocker,
};
use kb_03_recovery_config::{
    RecordingInstaller, RecoveryConfigApi, RecoveryConfigService, TemplateInstaller,
};
use kb_04_pool_create::{PoolCreateApi, PoolCreateService, PoolProvisioner, RecordingProvisioner};
use kb_05_recovery_session::{
    MemoryChallenger, MemoryLiveness, ProcessLiveness, RecoveryChallenger, RecoverySessionApi,
    RecoverySessionService,
};
use shared_storage::{KeyLoader, MemoryStorage, StorageBackend, StorageHandle};
use shared_types::{JsonTemplateDecoder, TemplateDecoder};
use std::sync::Arc;

use crate::dispatch::Dispatcher;

/// Pool name the in-memory provisioner reports when none is requested.
pub const DEFAULT_PROVISIONED_POOL: &str = "zones";

/// Implementations of every outbound port.
pub struct Backends {
    pub storage: Box<dyn StorageBackend>,
    pub keys: Arc<dyn KeyLoader>,
    pub tokens: Arc<dyn TokenDirectory>,
    pub boxes: Arc<dyn RecoveryBoxStore>,
    pub unlocker: Arc<dyn RecoveryBoxUnlocker>,
    pub installer: Arc<dyn TemplateInstaller>,
    pub provisioner: Arc<dyn PoolProvisioner>,
    pub challenger: Arc<dyn RecoveryChallenger>,
    pub liveness: Arc<dyn ProcessLiveness>,
    pub decoder: Arc<dyn TemplateDecoder>,
}

/// Concrete handles onto the in-memory backends, for seeding and inspection.
#[derive(Clone)]
pub struct MemoryBackends {
    pub storage: MemoryStorage,
    pub tokens: Arc<MemoryTokenDirectory>,
    pub vault: Arc<MemoryRecoveryVault>,
    pub installer: Arc<RecordingInstaller>,
    pub provisioner: Arc<RecordingProvisioner>,
    pub challenger: Arc<MemoryChallenger>,
    pub liveness: Arc<MemoryLiveness>,
}

impl Backends {
    /// In-memory backends for every port.
    pub fn memory() -> (Self, MemoryBackends) {
        let storage = MemoryStorage::new();
        let tokens = Arc::new(MemoryTokenDirectory::new());
        let vault = Arc::new(MemoryRecoveryVault::new(tokens.clone()));
        let installer = Arc::new(RecordingInstaller::new());
        let provisioner = Arc::new(RecordingProvisioner::new(DEFAULT_PROVISIONED_POOL));
        let challenger = Arc::new(MemoryChallenger::new());
        let liveness = Arc::new(MemoryLiveness::new());

        let backends = Self {
            storage: Box::new(storage.clone()),
            keys: Arc::new(storage.clone()),
            tokens: tokens.clone(),
            boxes: vault.clone(),
            unlocker: vault.clone(),
            installer: installer.clone(),
            provisioner: provisioner.clone(),
            challenger: challenger.clone(),
            liveness: liveness.clone(),
            decoder: Arc::new(JsonTemplateDecoder),
        };
        let handles = MemoryBackends {
            storage,
            tokens,
            vault,
            installer,
            provisioner,
            challenger,
            liveness,
        };
        (backends, handles)
    }
}

/// Shared state plus every service, wired together.
pub struct Container {
    pub identity: Arc<IdentityStore>,
    pub storage: Arc<StorageHandle>,
    identity_api: Arc<dyn SystemIdentityApi>,
    unlock_api: Arc<dyn DatasetUnlockApi>,
    recovery_api: Arc<dyn RecoveryConfigApi>,
    pool_api: Arc<dyn PoolCreateApi>,
    session_api: Arc<dyn RecoverySessionApi>,
    dispatcher: Arc<Dispatcher>,
}

impl Container {
    pub fn new(backends: Backends) -> Self {
        let Backends {
            storage,
            keys,
            tokens,
            boxes,
            unlocker,
            installer,
            provisioner,
            challenger,
            liveness,
            decoder,
        } = backends;

        let identity = Arc::new(IdentityStore::new());
        let storage = Arc::new(StorageHandle::from_boxed(storage));

        let identity_api: Arc<dyn SystemIdentityApi> = Arc::new(SystemIdentityService::new(
            identity.clone(),
            storage.clone(),
            tokens,
        ));
        let unlock_api: Arc<dyn DatasetUnlockApi> = Arc::new(DatasetUnlockService::new(
            identity.clone(),
            storage.clone(),
            boxes.clone(),
            unlocker,
            keys.clone(),
        ));
        let recovery_api: Arc<dyn RecoveryConfigApi> =
            Arc::new(RecoveryConfigService::new(identity.clone(), installer));
        let pool_api: Arc<dyn PoolCreateApi> =
            Arc::new(PoolCreateService::new(provisioner, decoder.clone()));
        let session_api: Arc<dyn RecoverySessionApi> = Arc::new(RecoverySessionService::new(
            identity.clone(),
            boxes,
            challenger,
            keys,
            liveness,
        ));

        let dispatcher = Arc::new(Dispatcher::new(
            identity_api.clone(),
            unlock_api.clone(),
            recovery_api.clone(),
            pool_api.clone(),
            session_api.clone(),
            decoder,
        ));

        Self {
            identity,
            storage,
            identity_api,
            unlock_api,
            recovery_api,
            pool_api,
            session_api,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    pub fn identity_api(&self) -> &Arc<dyn SystemIdentityApi> {
        &self.identity_api
    }

    pub fn unlock_api(&self) -> &Arc<dyn DatasetUnlockApi> {
        &self.unlock_api
    }

    pub fn recovery_api(&self) -> &Arc<dyn RecoveryConfigApi> {
        &self.recovery_api
    }

    pub fn pool_api(&self) -> &Arc<dyn PoolCreateApi> {
        &self.pool_api
    }

    pub fn session_api(&self) -> &Arc<dyn RecoverySessionApi> {
        &self.session_api
    }
}
