//! # Inbound Ports

use crate::domain::errors::RecoveryConfigError;
use crate::domain::state::{Activation, AddOutcome, Cancellation, RecoveryListing};
use shared_types::RecoveryTemplate;

/// Recovery configuration API.
pub trait RecoveryConfigApi: Send + Sync {
    /// Stage `template`, or with `stage == false` install it immediately.
    fn add_recovery(
        &self,
        template: RecoveryTemplate,
        stage: bool,
    ) -> Result<AddOutcome, RecoveryConfigError>;

    /// Install the staged template. Nothing staged is a no-op.
    fn activate_recovery(&self) -> Result<Activation, RecoveryConfigError>;

    /// Drop the staged template. Nothing staged is a no-op.
    fn cancel_recovery(&self) -> Result<Cancellation, RecoveryConfigError>;

    fn list_recovery(&self) -> RecoveryListing;
}
