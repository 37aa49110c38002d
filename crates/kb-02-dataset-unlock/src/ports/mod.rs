//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the dispatcher uses
//! - **Outbound (Driven)**: Recovery box collaborators

pub mod inbound;
pub mod outbound;
