//! # Shared Storage
//!
//! Ports to the volume manager shared by every subsystem that touches
//! pools or datasets.
//!
//! ## Locking
//!
//! The volume manager's handle is not safe for concurrent use, so every
//! pool-existence and dataset-metadata query goes through [`StorageHandle`],
//! which owns the backend behind a single process-wide mutex.
//!
//! When a caller needs both the identity lock and the storage-handle lock,
//! it takes the identity lock first. The storage-handle lock is only ever
//! held for the duration of one query, so no code path holds it while
//! acquiring another lock.
//!
//! Key loading goes through [`KeyLoader`], which does not use the handle.
//!
//! ## Module Structure
//!
//! ```text
//! error.rs   - StorageError, SystemError
//! ports.rs   - StorageBackend, KeyLoader, DatasetStatus
//! handle.rs  - StorageHandle (the storage-handle lock)
//! memory.rs  - MemoryStorage (in-memory backend for tests and development)
//! ```

pub mod error;
pub mod handle;
pub mod memory;
pub mod ports;

pub use error::{errno, StorageError, SystemError};
pub use handle::StorageHandle;
pub use memory::{MemoryDataset, MemoryStorage};
pub use ports::{DatasetStatus, KeyLoadOutcome, KeyLoader, StorageBackend};
