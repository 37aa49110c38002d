//! # Adapters

pub mod recording;
