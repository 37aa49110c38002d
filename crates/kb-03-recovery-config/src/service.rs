//! # Recovery Configuration Service
//!
//! Application service implementing [`RecoveryConfigApi`].

use crate::domain::errors::RecoveryConfigError;
use crate::domain::state::{Activation, AddOutcome, Cancellation, RecoveryListing, RecoveryState};
use crate::ports::inbound::RecoveryConfigApi;
use crate::ports::outbound::TemplateInstaller;
use kb_01_system_identity::{IdentityGuard, IdentityStore};
use parking_lot::Mutex;
use shared_types::RecoveryTemplate;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RecoveryConfigService<I: TemplateInstaller + ?Sized> {
    identity: Arc<IdentityStore>,
    state: Mutex<RecoveryState>,
    installer: Arc<I>,
}

impl<I: TemplateInstaller + ?Sized> RecoveryConfigService<I> {
    pub fn new(identity: Arc<IdentityStore>, installer: Arc<I>) -> Self {
        Self {
            identity,
            state: Mutex::new(RecoveryState::default()),
            installer,
        }
    }

    fn install(
        &self,
        identity: &IdentityGuard<'_>,
        template: &RecoveryTemplate,
    ) -> Result<(), RecoveryConfigError> {
        let pool = identity
            .pool
            .as_deref()
            .ok_or(RecoveryConfigError::NoSystemPool)?;
        self.installer
            .install(pool, template)
            .map_err(|source| RecoveryConfigError::Install {
                pool: pool.to_owned(),
                source,
            })
    }
}

impl<I: TemplateInstaller + ?Sized> RecoveryConfigApi for RecoveryConfigService<I> {
    fn add_recovery(
        &self,
        template: RecoveryTemplate,
        stage: bool,
    ) -> Result<AddOutcome, RecoveryConfigError> {
        let identity = self.identity.lock();
        if stage {
            let replaced = self.state.lock().stage(template);
            info!(replaced, "recovery template staged");
            return Ok(AddOutcome::Staged { replaced });
        }

        self.install(&identity, &template)?;
        self.state.lock().effective = Some(template);
        info!("recovery template applied");
        Ok(AddOutcome::Applied)
    }

    fn activate_recovery(&self) -> Result<Activation, RecoveryConfigError> {
        let identity = self.identity.lock();
        let mut state = self.state.lock();
        let Some(staged) = state.staged.as_ref() else {
            debug!("activate with nothing staged");
            return Ok(Activation::NothingStaged);
        };

        // A failed install keeps the staged template for a retry.
        self.install(&identity, staged)?;
        state.promote();
        info!("staged recovery template activated");
        Ok(Activation::Activated)
    }

    fn cancel_recovery(&self) -> Result<Cancellation, RecoveryConfigError> {
        let _identity = self.identity.lock();
        if self.state.lock().discard_staged() {
            info!("staged recovery template discarded");
            Ok(Cancellation::Discarded)
        } else {
            debug!("cancel with nothing staged");
            Ok(Cancellation::NothingStaged)
        }
    }

    fn list_recovery(&self) -> RecoveryListing {
        self.state.lock().listing()
    }
}
