//! # Keybroker Telemetry
//!
//! Structured logging for the daemon. Logs go to stderr, either as
//! human-readable lines or as one JSON object per line for log shippers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kb_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     tracing::info!("started");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `KB_JSON_LOGS` | `false` | One JSON object per line |
//! | `KB_SERVICE_NAME` | `keybroker` | Service name on every event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

/// Span for one request, carrying the requester pid and command name.
///
/// ```rust,ignore
/// let _span = kb_telemetry::request_span!(pid, "unlock_dataset").entered();
/// ```
#[macro_export]
macro_rules! request_span {
    ($pid:expr, $command:expr) => {
        tracing::info_span!("request", pid = $pid, command = %$command)
    };
}
