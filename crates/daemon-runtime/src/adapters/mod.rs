//! Runtime adapters.
//!
//! - `zfs_cli` - storage backend driving the `zfs` and `zpool` tools
//! - `fixture` - JSON fixture seeding the in-memory backends

pub mod fixture;
pub mod zfs_cli;
