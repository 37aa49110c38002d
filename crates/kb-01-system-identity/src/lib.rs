//! # System Identity Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Tracks which hardware token and which storage pool the broker treats as
//! the system's own. Both start unset and live for the life of the process.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Identity is only read or written under the identity lock | `domain/identity.rs` - `IdentityStore` |
//! | Setting the current value again changes nothing | `service.rs` - `IdentityChange::Unchanged` |
//! | A failed lookup leaves the identity untouched | `service.rs` - replace only after lookup |
//! | Pool existence is checked without the identity lock | `service.rs` - `set_system_pool` |
//!
//! ## Outbound Dependencies
//!
//! | Dependency | Trait | Purpose |
//! |-----------|-------|---------|
//! | Token layer | `TokenDirectory` | Find a token by GUID |
//! | Volume manager | `StorageHandle` | Pool existence |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! domain/identity.rs   - SystemIdentity, IdentityStore (the identity lock)
//! domain/errors.rs     - IdentityError
//! ports/inbound.rs     - SystemIdentityApi
//! ports/outbound.rs    - TokenDirectory, TokenLookupError
//! adapters/memory.rs   - MemoryTokenDirectory
//! service.rs           - SystemIdentityService
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::memory::MemoryTokenDirectory;
pub use domain::errors::IdentityError;
pub use domain::identity::{IdentityChange, IdentityGuard, IdentityStore, SystemIdentity};
pub use ports::inbound::SystemIdentityApi;
pub use ports::outbound::{TokenDirectory, TokenLookupError};
pub use service::SystemIdentityService;
