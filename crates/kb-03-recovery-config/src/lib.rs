//! # Recovery Configuration Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Manages which recovery template protects the system pool's key.
//!
//! ```text
//!            add(stage)              activate
//! [none] ──────────────→ [STAGED] ─────────────→ [EFFECTIVE]
//!                          │  ↑
//!                   cancel │  │ add(stage) replaces
//!                          ↓  │
//!                        [none]
//!
//! add(no stage) installs straight to EFFECTIVE, leaving STAGED alone.
//! ```
//!
//! At most one template is staged at a time; the last writer wins.
//! A template becomes effective only after the `TemplateInstaller` has
//! re-sealed the system pool's recovery box with it.
//!
//! ## Locking
//!
//! Mutations run under the identity lock (the system pool must not change
//! mid-install), then take this subsystem's own state lock.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::recording::RecordingInstaller;
pub use domain::errors::RecoveryConfigError;
pub use domain::state::{Activation, AddOutcome, Cancellation, RecoveryListing, RecoveryState};
pub use ports::inbound::RecoveryConfigApi;
pub use ports::outbound::{InstallError, TemplateInstaller};
pub use service::RecoveryConfigService;
