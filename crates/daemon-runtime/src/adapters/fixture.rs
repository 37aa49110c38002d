//! # Development Fixture
//!
//! Seeds the in-memory backends from a JSON file so the daemon can be run
//! and exercised without tokens or pools.
//!
//! ```json
//! {
//!   "pools": ["zones"],
//!   "datasets": [{ "name": "zones/data", "encrypted": true, "key": "6b6579" }],
//!   "tokens": [{ "guid": "00112233445566778899AABBCCDDEEFF", "label": "yubikey" }],
//!   "boxes": [{ "owner": "zones/data", "guid": "00112233445566778899AABBCCDDEEFF", "key": "6b6579" }],
//!   "recovery": [{
//!     "owner": "zones",
//!     "key": "6b6579",
//!     "configs": [{ "threshold": 1, "parties": [
//!       { "name": "alice", "guid": "0102030405060708090A0B0C0D0E0F10", "secret": "736563726574" }
//!     ]}]
//!   }]
//! }
//! ```
//!
//! Binary values are hex strings.

use kb_05_recovery_session::{MemoryConfig, MemoryParty};
use serde::{Deserialize, Deserializer};
use shared_storage::MemoryDataset;
use shared_types::{Guid, Token};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::container::MemoryBackends;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("unable to read fixture")]
    Read(#[from] std::io::Error),

    #[error("malformed fixture")]
    Parse(#[from] serde_json::Error),

    #[error("dataset '{0}' has a key but is not encrypted")]
    PlainDatasetWithKey(String),
}

fn hex_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s).map_err(serde::de::Error::custom)
}

fn optional_hex_bytes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<u8>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
        .transpose()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureDataset {
    pub name: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub key_loaded: bool,
    #[serde(default, deserialize_with = "optional_hex_bytes")]
    pub key: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureBox {
    pub owner: String,
    pub guid: Guid,
    #[serde(deserialize_with = "hex_bytes")]
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureParty {
    pub name: String,
    pub guid: Guid,
    #[serde(deserialize_with = "hex_bytes")]
    pub secret: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureConfig {
    pub threshold: u32,
    pub parties: Vec<FixtureParty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRecovery {
    pub owner: String,
    #[serde(deserialize_with = "hex_bytes")]
    pub key: Vec<u8>,
    pub configs: Vec<FixtureConfig>,
}

/// Contents of a fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DevFixture {
    pub pools: Vec<String>,
    pub datasets: Vec<FixtureDataset>,
    pub tokens: Vec<Token>,
    pub boxes: Vec<FixtureBox>,
    pub recovery: Vec<FixtureRecovery>,
}

impl DevFixture {
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read(path)?;
        Self::from_slice(&raw)
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, FixtureError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Seed `memory`. Datasets are checked before anything is written.
    pub fn apply(&self, memory: &MemoryBackends) -> Result<(), FixtureError> {
        let datasets = self
            .datasets
            .iter()
            .map(|d| Ok((d.name.clone(), Self::dataset(d)?)))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        for pool in &self.pools {
            memory.storage.add_pool(pool.clone());
        }
        for (name, dataset) in datasets {
            memory.storage.add_dataset(name, dataset);
        }
        for token in &self.tokens {
            memory.tokens.insert(token.clone());
        }
        for rbox in &self.boxes {
            memory.vault.seal(&rbox.owner, &rbox.guid, &rbox.key);
        }
        for recovery in &self.recovery {
            let configs = recovery
                .configs
                .iter()
                .map(|c| MemoryConfig {
                    threshold: c.threshold,
                    parties: c
                        .parties
                        .iter()
                        .map(|p| MemoryParty::new(p.name.clone(), p.guid, p.secret.clone()))
                        .collect(),
                })
                .collect();
            memory.challenger.register(recovery.owner.clone(), &recovery.key, configs);
        }

        debug!(
            pools = self.pools.len(),
            datasets = self.datasets.len(),
            tokens = self.tokens.len(),
            boxes = self.boxes.len(),
            recovery = self.recovery.len(),
            "fixture seeded"
        );
        Ok(())
    }

    fn dataset(d: &FixtureDataset) -> Result<MemoryDataset, FixtureError> {
        if !d.encrypted {
            if d.key.is_some() {
                return Err(FixtureError::PlainDatasetWithKey(d.name.clone()));
            }
            return Ok(MemoryDataset::plain());
        }
        let base = if d.key_loaded {
            MemoryDataset::unlocked()
        } else {
            MemoryDataset::locked()
        };
        Ok(match &d.key {
            Some(key) => base.with_key(key.clone()),
            None => base,
        })
    }
}
