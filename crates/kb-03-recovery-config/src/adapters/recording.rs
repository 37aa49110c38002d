//! Template installer that records what it was given.

use crate::ports::outbound::{InstallError, TemplateInstaller};
use parking_lot::Mutex;
use shared_types::RecoveryTemplate;
use tracing::debug;

#[derive(Default)]
pub struct RecordingInstaller {
    installs: Mutex<Vec<(String, RecoveryTemplate)>>,
    failure: Mutex<Option<InstallError>>,
}

impl RecordingInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every install with `error` until cleared.
    pub fn fail_with(&self, error: Option<InstallError>) {
        *self.failure.lock() = error;
    }

    pub fn installs(&self) -> Vec<(String, RecoveryTemplate)> {
        self.installs.lock().clone()
    }
}

impl TemplateInstaller for RecordingInstaller {
    fn install(&self, pool: &str, template: &RecoveryTemplate) -> Result<(), InstallError> {
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        debug!(pool, configs = template.configs.len(), "template installed");
        self.installs
            .lock()
            .push((pool.to_owned(), template.clone()));
        Ok(())
    }
}
