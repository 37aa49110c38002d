//! # Recovery Session Service
//!
//! Application service implementing [`RecoverySessionApi`].

use crate::domain::errors::RecoverySessionError;
use crate::domain::session::{RecoveryProgress, RecoverySession, RecoveryStarted};
use crate::ports::inbound::RecoverySessionApi;
use crate::ports::outbound::{ProcessLiveness, RecoveryChallenger, ResponseProgress};
use kb_01_system_identity::IdentityStore;
use kb_02_dataset_unlock::RecoveryBoxStore;
use parking_lot::Mutex;
use shared_storage::KeyLoader;
use shared_types::Pid;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct RecoverySessionService<B, C, K>
where
    B: RecoveryBoxStore + ?Sized,
    C: RecoveryChallenger + ?Sized,
    K: KeyLoader + ?Sized,
{
    identity: Arc<IdentityStore>,
    boxes: Arc<B>,
    challenger: Arc<C>,
    keys: Arc<K>,
    liveness: Arc<dyn ProcessLiveness>,
    session: Mutex<Option<RecoverySession>>,
}

impl<B, C, K> RecoverySessionService<B, C, K>
where
    B: RecoveryBoxStore + ?Sized,
    C: RecoveryChallenger + ?Sized,
    K: KeyLoader + ?Sized,
{
    pub fn new(
        identity: Arc<IdentityStore>,
        boxes: Arc<B>,
        challenger: Arc<C>,
        keys: Arc<K>,
        liveness: Arc<dyn ProcessLiveness>,
    ) -> Self {
        Self {
            identity,
            boxes,
            challenger,
            keys,
            liveness,
            session: Mutex::new(None),
        }
    }
}

impl<B, C, K> RecoverySessionApi for RecoverySessionService<B, C, K>
where
    B: RecoveryBoxStore + ?Sized,
    C: RecoveryChallenger + ?Sized,
    K: KeyLoader + ?Sized,
{
    fn recover_start(
        &self,
        pid: Pid,
        config: Option<u32>,
    ) -> Result<RecoveryStarted, RecoverySessionError> {
        let identity = self.identity.lock();
        let pool = identity
            .pool
            .clone()
            .ok_or(RecoverySessionError::NoSystemPool)?;

        let mut slot = self.session.lock();
        if let Some(active) = slot.as_ref() {
            if active.owner == pid {
                info!(pid, session = %active.id, "restarting recovery");
            } else if self.liveness.is_alive(active.owner) {
                return Err(RecoverySessionError::InProgress {
                    owner: active.owner,
                });
            } else {
                warn!(
                    pid,
                    owner = active.owner,
                    session = %active.id,
                    "recovery owner exited, reclaiming session"
                );
            }
        }
        *slot = None;

        let rbox = self
            .boxes
            .get_recovery_box(&pool, false)
            .map_err(|source| RecoverySessionError::RecoveryBox {
                pool: pool.clone(),
                source,
            })?;
        let begun = self
            .challenger
            .begin(&rbox, config.unwrap_or(0))
            .map_err(RecoverySessionError::Challenge)?;

        let id = Uuid::new_v4();
        info!(
            pid,
            pool = %pool,
            session = %id,
            required = begun.required,
            "recovery started"
        );
        *slot = Some(RecoverySession {
            id,
            owner: pid,
            pool,
            remaining: begun.required,
            challenge: begun.session,
        });
        Ok(RecoveryStarted {
            session: id,
            challenges: begun.challenges,
            remaining: begun.required,
        })
    }

    fn recover_respond(
        &self,
        pid: Pid,
        response: &[u8],
    ) -> Result<RecoveryProgress, RecoverySessionError> {
        let identity = self.identity.lock();
        let mut slot = self.session.lock();
        let session = match slot.as_mut() {
            Some(session) if session.owner == pid => session,
            _ => return Err(RecoverySessionError::NoSession { pid }),
        };

        if !identity.is_system_pool(&session.pool) {
            let pool = session.pool.clone();
            warn!(pid, pool = %pool, "system pool changed, abandoning recovery");
            *slot = None;
            return Err(RecoverySessionError::PoolChanged { pool });
        }

        match session.challenge.respond(response) {
            Err(e) => {
                warn!(pid, session = %session.id, error = %e, "recovery response rejected");
                *slot = None;
                Err(RecoverySessionError::Challenge(e))
            }
            Ok(ResponseProgress::Remaining(n)) => {
                session.remaining = n;
                info!(pid, session = %session.id, remaining = n, "recovery response accepted");
                Ok(RecoveryProgress::Remaining(n))
            }
            Ok(ResponseProgress::Recovered(key)) => {
                let pool = session.pool.clone();
                let id = session.id;
                *slot = None;
                let outcome = self
                    .keys
                    .load_key(&pool, key.key())
                    .map_err(|source| RecoverySessionError::KeyLoad {
                        pool: pool.clone(),
                        source,
                    })?;
                info!(pid, session = %id, pool = %pool, ?outcome, "recovery complete");
                Ok(RecoveryProgress::Complete(outcome))
            }
        }
    }

    fn session_owner(&self) -> Option<Pid> {
        self.session.lock().as_ref().map(|s| s.owner)
    }
}
