//! Keybroker daemon entry point.

use anyhow::{Context, Result};
use daemon_runtime::container::DaemonConfig;
use daemon_runtime::KeybrokerRuntime;
use kb_telemetry::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DaemonConfig::from_env();
    init_logging(&config.telemetry)?;
    config.validate().context("invalid configuration")?;

    let runtime = KeybrokerRuntime::new(config)?;
    runtime.run().await
}
