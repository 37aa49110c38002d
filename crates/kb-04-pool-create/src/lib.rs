//! # Pool Creation Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! Validates the optional parameters of a pool-creation request and hands
//! them to the provisioner in a single call.
//!
//! Every parameter is optional. An absent parameter lets the provisioner
//! pick its default; a present but malformed one is rejected before the
//! provisioner is called.
//!
//! | Parameter | Check | Failure |
//! |-----------|-------|---------|
//! | `dataset` | dataset-name syntax | `ParameterError` |
//! | `guid` | exactly `GUID_LEN` bytes | `InvalidGUID` |
//! | `template` | decodes | `DecodeError` |
//! | `recovery_token` | none, forwarded as-is | |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::recording::RecordingProvisioner;
pub use domain::errors::PoolCreateError;
pub use domain::params::{PoolCreateParams, PoolCreateRequest};
pub use ports::inbound::PoolCreateApi;
pub use ports::outbound::{PoolProvisioner, ProvisionError, ProvisionedPool};
pub use service::PoolCreateService;
