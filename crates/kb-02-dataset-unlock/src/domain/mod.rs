//! # Domain Layer

pub mod decision;
pub mod errors;
