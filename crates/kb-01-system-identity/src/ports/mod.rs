//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the dispatcher uses
//! - **Outbound (Driven)**: Dependencies this subsystem needs

pub mod inbound;
pub mod outbound;
