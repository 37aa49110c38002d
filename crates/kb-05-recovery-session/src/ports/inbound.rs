//! # Inbound Ports

use crate::domain::errors::RecoverySessionError;
use crate::domain::session::{RecoveryProgress, RecoveryStarted};
use shared_types::Pid;

/// Recovery handshake API.
pub trait RecoverySessionApi: Send + Sync {
    /// Begin recovering the system pool's key with configuration `config`
    /// (default 0) of its recovery box.
    fn recover_start(
        &self,
        pid: Pid,
        config: Option<u32>,
    ) -> Result<RecoveryStarted, RecoverySessionError>;

    /// Submit one party's answer.
    fn recover_respond(
        &self,
        pid: Pid,
        response: &[u8],
    ) -> Result<RecoveryProgress, RecoverySessionError>;

    /// Process owning the in-progress session, if any.
    fn session_owner(&self) -> Option<Pid>;
}
