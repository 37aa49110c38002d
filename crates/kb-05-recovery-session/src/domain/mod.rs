//! # Domain Layer

pub mod errors;
pub mod session;
