//! # In-Memory Challenger
//!
//! Each recovery party holds a secret. A challenge is a random nonce and the
//! party's answer is HMAC-SHA256 of the nonce under its secret, so tests can
//! play a party with [`MemoryParty::answer`].

use crate::ports::outbound::{
    Begun, Challenge, ChallengeError, ChallengeSession, RecoveryChallenger, ResponseProgress,
};
use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use rand::RngCore;
use sha2::Sha256;
use shared_types::{Guid, RecoveredKey, RecoveryBox};
use std::collections::HashMap;
use tracing::debug;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 32;

/// A recovery party and its shared secret.
#[derive(Clone)]
pub struct MemoryParty {
    pub name: String,
    pub guid: Guid,
    secret: Zeroizing<Vec<u8>>,
}

impl MemoryParty {
    pub fn new(name: impl Into<String>, guid: Guid, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            guid,
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// This party's answer to `challenge`.
    pub fn answer(&self, challenge: &[u8]) -> Result<Vec<u8>, ChallengeError> {
        let mut mac = keyed(&self.secret)?;
        mac.update(challenge);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn accepts(&self, challenge: &[u8], response: &[u8]) -> bool {
        match keyed(&self.secret) {
            Ok(mut mac) => {
                mac.update(challenge);
                mac.verify_slice(response).is_ok()
            }
            Err(_) => false,
        }
    }
}

fn keyed(secret: &[u8]) -> Result<HmacSha256, ChallengeError> {
    HmacSha256::new_from_slice(secret).map_err(|_| ChallengeError::Rejected {
        reason: "invalid party secret".into(),
    })
}

/// An n-of-m group of parties.
#[derive(Clone)]
pub struct MemoryConfig {
    pub threshold: u32,
    pub parties: Vec<MemoryParty>,
}

struct Recoverable {
    key: Zeroizing<Vec<u8>>,
    configs: Vec<MemoryConfig>,
}

/// [`RecoveryChallenger`] over keys registered per recovery-box owner.
#[derive(Default)]
pub struct MemoryChallenger {
    boxes: RwLock<HashMap<String, Recoverable>>,
}

impl MemoryChallenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `owner`'s key recoverable through `configs`.
    pub fn register(&self, owner: impl Into<String>, key: &[u8], configs: Vec<MemoryConfig>) {
        self.boxes.write().insert(
            owner.into(),
            Recoverable {
                key: Zeroizing::new(key.to_vec()),
                configs,
            },
        );
    }
}

impl RecoveryChallenger for MemoryChallenger {
    fn begin(&self, rbox: &RecoveryBox, config: u32) -> Result<Begun, ChallengeError> {
        let boxes = self.boxes.read();
        let entry = boxes
            .get(&rbox.owner)
            .ok_or_else(|| ChallengeError::Unusable {
                owner: rbox.owner.clone(),
                reason: "no recovery configurations".into(),
            })?;
        let chosen = usize::try_from(config)
            .ok()
            .and_then(|i| entry.configs.get(i))
            .ok_or_else(|| ChallengeError::NoSuchConfig {
                owner: rbox.owner.clone(),
                config,
            })?;

        let mut rng = rand::thread_rng();
        let mut pending = Vec::with_capacity(chosen.parties.len());
        let mut challenges = Vec::with_capacity(chosen.parties.len());
        for party in &chosen.parties {
            let mut nonce = vec![0u8; NONCE_LEN];
            rng.fill_bytes(&mut nonce);
            challenges.push(Challenge {
                part: party.name.clone(),
                guid: party.guid,
                payload: nonce.clone(),
            });
            pending.push((party.clone(), nonce));
        }

        Ok(Begun {
            session: Box::new(MemoryChallengeSession {
                key: entry.key.clone(),
                pending,
                needed: chosen.threshold,
            }),
            challenges,
            required: chosen.threshold,
        })
    }
}

struct MemoryChallengeSession {
    key: Zeroizing<Vec<u8>>,
    pending: Vec<(MemoryParty, Vec<u8>)>,
    needed: u32,
}

impl ChallengeSession for MemoryChallengeSession {
    fn respond(&mut self, response: &[u8]) -> Result<ResponseProgress, ChallengeError> {
        let index = self
            .pending
            .iter()
            .position(|(party, nonce)| party.accepts(nonce, response))
            .ok_or_else(|| ChallengeError::Rejected {
                reason: "response matches no outstanding challenge".into(),
            })?;
        let (party, _) = self.pending.remove(index);
        self.needed = self.needed.saturating_sub(1);
        debug!(part = %party.name, remaining = self.needed, "challenge answered");

        if self.needed > 0 {
            return Ok(ResponseProgress::Remaining(self.needed));
        }
        let key = std::mem::take(&mut *self.key);
        Ok(ResponseProgress::Recovered(RecoveredKey::new(key, None)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::GUID_LEN;

    fn party(name: &str, byte: u8) -> MemoryParty {
        MemoryParty::new(name, Guid::new([byte; GUID_LEN]), format!("{name}-secret"))
    }

    fn challenger() -> (MemoryChallenger, Vec<MemoryParty>) {
        let parties = vec![party("alice", 1), party("bob", 2), party("carol", 3)];
        let challenger = MemoryChallenger::new();
        challenger.register(
            "zones",
            b"pool-key",
            vec![MemoryConfig {
                threshold: 2,
                parties: parties.clone(),
            }],
        );
        (challenger, parties)
    }

    #[test]
    fn test_two_of_three_recovers_key() {
        let (challenger, parties) = challenger();
        let mut begun = challenger
            .begin(&RecoveryBox::new("zones", Vec::new()), 0)
            .unwrap();
        assert_eq!(begun.required, 2);
        assert_eq!(begun.challenges.len(), 3);

        let answer = parties[2].answer(&begun.challenges[2].payload).unwrap();
        assert!(matches!(
            begun.session.respond(&answer),
            Ok(ResponseProgress::Remaining(1))
        ));
        // The same answer twice does not count twice.
        assert!(begun.session.respond(&answer).is_err());

        let answer = parties[0].answer(&begun.challenges[0].payload).unwrap();
        match begun.session.respond(&answer) {
            Ok(ResponseProgress::Recovered(key)) => assert_eq!(key.key(), b"pool-key"),
            _ => panic!("expected the key to be recovered"),
        }
    }

    #[test]
    fn test_bad_config_and_unknown_box() {
        let (challenger, _) = challenger();
        assert!(matches!(
            challenger.begin(&RecoveryBox::new("zones", Vec::new()), 4),
            Err(ChallengeError::NoSuchConfig { config: 4, .. })
        ));
        assert!(matches!(
            challenger.begin(&RecoveryBox::new("other", Vec::new()), 0),
            Err(ChallengeError::Unusable { .. })
        ));
    }

    #[test]
    fn test_wrong_answer_is_rejected() {
        let (challenger, _) = challenger();
        let mut begun = challenger
            .begin(&RecoveryBox::new("zones", Vec::new()), 0)
            .unwrap();
        let outsider = party("mallory", 9);
        let forged = outsider.answer(&begun.challenges[0].payload).unwrap();
        assert!(matches!(
            begun.session.respond(&forged),
            Err(ChallengeError::Rejected { .. })
        ));
    }
}
