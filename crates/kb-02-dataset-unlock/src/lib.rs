//! # Dataset Unlock Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Loads the wrapping key of an encrypted dataset. The key lives sealed in
//! the dataset's recovery box; the system token (or another attached token
//! named in the box) opens it.
//!
//! ## Unlock Sequence
//!
//! ```text
//! [identity lock] ─→ status ─┬─ not encrypted ──→ ArgumentError
//!                            ├─ key loaded ─────→ AlreadyUnlocked
//!                            └─ locked ─→ fetch box ─→ open box ─→ load key
//!                                                                    │
//!                                     "already loaded" is success ←──┘
//! ```
//!
//! The identity lock is held from the status query through the key load and
//! released on every path.
//!
//! ## Outbound Dependencies
//!
//! | Dependency | Trait | Purpose |
//! |-----------|-------|---------|
//! | Volume manager | `StorageHandle`, `KeyLoader` | Status and key load |
//! | Recovery box store | `RecoveryBoxStore` | Fetch a dataset's box |
//! | Recovery box crypto | `RecoveryBoxUnlocker` | Open a box with a token |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::vault::MemoryRecoveryVault;
pub use domain::decision::{UnlockDecision, UnlockOutcome};
pub use domain::errors::UnlockError;
pub use ports::inbound::DatasetUnlockApi;
pub use ports::outbound::{RecoveryBoxError, RecoveryBoxStore, RecoveryBoxUnlocker};
pub use service::DatasetUnlockService;
