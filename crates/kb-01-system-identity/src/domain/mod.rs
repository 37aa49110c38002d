//! # Domain Layer
//!
//! Identity state and its lock. No I/O.

pub mod errors;
pub mod identity;
