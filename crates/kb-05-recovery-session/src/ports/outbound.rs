//! # Outbound Ports

use shared_types::{Classified, ErrorKind, Guid, Pid, RecoveredKey, RecoveryBox};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error("recovery box for '{owner}' has no configuration {config}")]
    NoSuchConfig { owner: String, config: u32 },

    #[error("recovery box for '{owner}' cannot be challenged: {reason}")]
    Unusable { owner: String, reason: String },

    #[error("response rejected: {reason}")]
    Rejected { reason: String },
}

impl Classified for ChallengeError {
    fn kind(&self) -> ErrorKind {
        match self {
            ChallengeError::Unusable { .. } => ErrorKind::RecoveryBoxError,
            _ => ErrorKind::RecoveryError,
        }
    }
}

/// One challenge addressed to one recovery party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub part: String,
    pub guid: Guid,
    pub payload: Vec<u8>,
}

/// A started challenge exchange.
pub struct Begun {
    pub session: Box<dyn ChallengeSession>,
    pub challenges: Vec<Challenge>,
    /// Answers needed to recover the key.
    pub required: u32,
}

pub enum ResponseProgress {
    Remaining(u32),
    Recovered(RecoveredKey),
}

/// Issues challenges for a recovery box configuration.
pub trait RecoveryChallenger: Send + Sync {
    fn begin(&self, rbox: &RecoveryBox, config: u32) -> Result<Begun, ChallengeError>;
}

/// State of one challenge exchange.
pub trait ChallengeSession: Send {
    fn respond(&mut self, response: &[u8]) -> Result<ResponseProgress, ChallengeError>;
}

/// Whether a requesting process still exists.
///
/// A session owned by an exited process can be taken over by another
/// requester.
pub trait ProcessLiveness: Send + Sync {
    fn is_alive(&self, pid: Pid) -> bool;
}
