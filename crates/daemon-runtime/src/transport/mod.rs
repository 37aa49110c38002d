//! Client transports.

mod socket;

pub use socket::{FrameError, SocketServer};
