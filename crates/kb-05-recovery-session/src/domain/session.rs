//! Session state and the payloads returned to clients.

use crate::ports::outbound::{Challenge, ChallengeSession};
use shared_storage::KeyLoadOutcome;
use shared_types::{fields, Envelope, Pid};
use uuid::Uuid;

/// The single in-progress recovery.
pub struct RecoverySession {
    pub id: Uuid,
    pub owner: Pid,
    pub pool: String,
    pub remaining: u32,
    pub challenge: Box<dyn ChallengeSession>,
}

/// Reply to a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryStarted {
    pub session: Uuid,
    pub challenges: Vec<Challenge>,
    pub remaining: u32,
}

impl RecoveryStarted {
    pub fn to_envelope(&self) -> Envelope {
        let challenges: Vec<Envelope> = self
            .challenges
            .iter()
            .map(|c| {
                Envelope::new()
                    .with(fields::PART, c.part.as_str())
                    .with(fields::GUID, c.guid.to_string())
                    .with(fields::CHALLENGE, c.payload.clone())
            })
            .collect();
        Envelope::new()
            .with(fields::CHALLENGES, challenges)
            .with(fields::REMAINING, self.remaining)
    }
}

/// Reply to an accepted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryProgress {
    Remaining(u32),
    Complete(KeyLoadOutcome),
}

impl RecoveryProgress {
    pub fn to_envelope(&self) -> Envelope {
        match self {
            RecoveryProgress::Remaining(n) => Envelope::new()
                .with(fields::REMAINING, *n)
                .with(fields::COMPLETE, false),
            RecoveryProgress::Complete(_) => Envelope::new()
                .with(fields::REMAINING, 0u32)
                .with(fields::COMPLETE, true),
        }
    }
}
