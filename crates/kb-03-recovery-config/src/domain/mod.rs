//! # Domain Layer

pub mod errors;
pub mod listing;
pub mod state;
