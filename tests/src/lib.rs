//! # Keybroker Test Suite
//!
//! Cross-subsystem flows driven through the request dispatcher over the
//! in-memory backends.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs                   # Harness: container, memory backends, request builders
//!     ├── dispatch_flows.rs        # Command decoding, identity, unlock, pool creation
//!     ├── recovery_flows.rs        # Staging lifecycle and the recovery handshake
//!     └── identity_concurrency.rs  # Lock behaviour under contention
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kb-tests
//! cargo test -p kb-tests integration::recovery_flows::
//! ```

#![allow(dead_code)]

pub mod integration;
