//! # Request Dispatch
//!
//! Decodes a request envelope into a [`Command`], routes it to exactly one
//! subsystem API, and converts the outcome into exactly one [`Response`].
//!
//! `Dispatcher::dispatch` takes the envelope by value and returns the
//! response by value, so a request can be neither reused nor answered twice.

mod command;
mod error;

pub use command::Command;
pub use error::DispatchError;

use kb_01_system_identity::SystemIdentityApi;
use kb_02_dataset_unlock::DatasetUnlockApi;
use kb_03_recovery_config::RecoveryConfigApi;
use kb_04_pool_create::PoolCreateApi;
use kb_05_recovery_session::RecoverySessionApi;
use shared_types::{fields, Envelope, ErrorReply, Pid, Response, TemplateDecoder};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes decoded commands to the subsystem services.
pub struct Dispatcher {
    identity: Arc<dyn SystemIdentityApi>,
    unlock: Arc<dyn DatasetUnlockApi>,
    recovery: Arc<dyn RecoveryConfigApi>,
    pools: Arc<dyn PoolCreateApi>,
    sessions: Arc<dyn RecoverySessionApi>,
    decoder: Arc<dyn TemplateDecoder>,
}

impl Dispatcher {
    pub fn new(
        identity: Arc<dyn SystemIdentityApi>,
        unlock: Arc<dyn DatasetUnlockApi>,
        recovery: Arc<dyn RecoveryConfigApi>,
        pools: Arc<dyn PoolCreateApi>,
        sessions: Arc<dyn RecoverySessionApi>,
        decoder: Arc<dyn TemplateDecoder>,
    ) -> Self {
        Self {
            identity,
            unlock,
            recovery,
            pools,
            sessions,
            decoder,
        }
    }

    /// Handle one request from process `pid`.
    ///
    /// This is the only place a [`Response`] is produced.
    pub fn dispatch(&self, request: Envelope, pid: Pid) -> Response {
        match self.handle(request, pid) {
            Ok(payload) => Response::Success(payload),
            Err(err) => Response::Error(ErrorReply::from_error(&err)),
        }
    }

    fn handle(&self, request: Envelope, pid: Pid) -> Result<Envelope, DispatchError> {
        let command = match Command::decode(request) {
            Ok(command) => command,
            Err(err @ (DispatchError::UnreadableCommand(_) | DispatchError::UnknownCommand(_))) => {
                info!(pid, error = %err, "Unrecognized command");
                return Err(err);
            }
            Err(err) => {
                warn!(pid, error = %err, "malformed request");
                return Err(err);
            }
        };

        let tag = command.tag();
        let _span = kb_telemetry::request_span!(pid, tag).entered();
        debug!("dispatching");

        self.execute(command, pid).inspect_err(|err| {
            warn!(error = %err, "request failed");
        })
    }

    fn execute(&self, command: Command, pid: Pid) -> Result<Envelope, DispatchError> {
        match command {
            Command::UnlockDataset { dataset } => {
                self.unlock.unlock_dataset(&dataset)?;
                Ok(Envelope::new())
            }
            Command::CreatePool(request) => {
                let created = self.pools.create_pool(request)?;
                let mut payload = Envelope::new().with(fields::POOL, created.pool);
                if let Some(guid) = created.token_guid {
                    payload.insert(fields::GUID, guid.as_bytes().as_slice());
                }
                Ok(payload)
            }
            Command::RecoverStart { config } => {
                Ok(self.sessions.recover_start(pid, config)?.to_envelope())
            }
            Command::RecoverResp { response } => {
                Ok(self.sessions.recover_respond(pid, &response)?.to_envelope())
            }
            Command::AddRecovery { template, stage } => {
                let template = self.decoder.decode(&template)?;
                self.recovery.add_recovery(template, stage)?;
                Ok(Envelope::new())
            }
            Command::ListRecovery => Ok(self.recovery.list_recovery().to_envelope()),
            Command::ActivateRecovery => {
                self.recovery.activate_recovery()?;
                Ok(Envelope::new())
            }
            Command::CancelRecovery => {
                self.recovery.cancel_recovery()?;
                Ok(Envelope::new())
            }
            Command::SetSystemToken { guid } => {
                self.identity.set_system_token(&guid)?;
                Ok(Envelope::new())
            }
            Command::SetSystemPool { pool } => {
                self.identity.set_system_pool(&pool)?;
                Ok(Envelope::new())
            }
        }
    }
}
