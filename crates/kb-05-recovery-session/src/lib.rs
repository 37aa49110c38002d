//! # Recovery Session Subsystem
//!
//! **Subsystem ID:** 5
//!
//! ## Purpose
//!
//! Recovers the system pool's key when no token in its primary
//! configuration is available. Recovery parties each answer a challenge out
//! of band; once enough answers arrive the key is rebuilt and loaded into
//! the system pool's root dataset.
//!
//! ```text
//! RecoverStart(pid) ──→ challenges ──→ [IN PROGRESS, owned by pid]
//!                                          │
//!                 RecoverResp(pid) ────────┤ remaining > 0
//!                                          │
//!                                          └─→ key loaded, session ends
//! ```
//!
//! ## Session Rules
//!
//! - One session at a time, owned by the requesting process.
//! - Another process starting a session while one is active is refused,
//!   unless the owner has exited, in which case the session is reclaimed.
//! - The owner starting again restarts its session.
//! - A rejected response ends the session.
//!
//! ## Locking
//!
//! Identity lock first, then the session lock.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::memory::{MemoryChallenger, MemoryConfig, MemoryParty};
pub use adapters::process::{MemoryLiveness, ProcFsLiveness};
pub use domain::errors::RecoverySessionError;
pub use domain::session::{RecoveryProgress, RecoveryStarted};
pub use ports::inbound::RecoverySessionApi;
pub use ports::outbound::{
    Begun, Challenge, ChallengeError, ChallengeSession, ProcessLiveness, RecoveryChallenger,
    ResponseProgress,
};
pub use service::RecoverySessionService;
