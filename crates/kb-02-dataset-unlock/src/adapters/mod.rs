//! # Adapters

pub mod vault;
