//! # Keybroker Daemon Runtime
//!
//! Builds every subsystem service, then serves requests until shutdown.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and dependency injection
//! - `dispatch/` - Command decoding, routing and the single response point
//! - `adapters/` - ZFS command-line backend and the development fixture
//! - `transport/` - Unix socket server
//!
//! ## Request Flow
//!
//! ```text
//! socket line ──→ Envelope ──→ Command::decode ──→ subsystem API
//!                                    │                  │
//!                                    └── error ──┬──────┘
//!                                                ↓
//!                                  Response (exactly one per request)
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration and initialize logging
//! 2. Validate configuration
//! 3. Build backends, apply the development fixture if configured
//! 4. Build the container; designate the system pool if configured
//! 5. Serve until Ctrl-C, then remove the socket file

pub mod adapters;
pub mod container;
pub mod dispatch;
pub mod transport;

use anyhow::{Context, Result};
use kb_05_recovery_session::ProcFsLiveness;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::adapters::fixture::DevFixture;
use crate::adapters::zfs_cli::ZfsCliBackend;
use crate::container::{Backends, Container, DaemonConfig, StorageBackendKind};
use crate::transport::SocketServer;

/// Ports that stay on recording adapters under the ZFS backend. Requests
/// reaching them succeed without changing the host.
pub const RECORDING_PORTS_UNDER_ZFS: &[&str] = &["recovery installer", "pool provisioner"];

/// The daemon: configuration plus the wired container.
pub struct KeybrokerRuntime {
    config: DaemonConfig,
    container: Arc<Container>,
    recording_ports: &'static [&'static str],
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl KeybrokerRuntime {
    pub fn new(config: DaemonConfig) -> Result<Self> {
        let (mut backends, memory) = Backends::memory();
        backends.liveness = Arc::new(ProcFsLiveness::new());

        let mut recording_ports: &'static [&'static str] = &[];
        if config.backend_kind()? == StorageBackendKind::Zfs {
            let zfs = ZfsCliBackend::new(&config.zfs_bin, &config.zpool_bin);
            info!(
                zfs = %config.zfs_bin.display(),
                zpool = %config.zpool_bin.display(),
                "using ZFS command-line backend"
            );
            backends.keys = Arc::new(zfs.clone());
            backends.storage = Box::new(zfs);
            recording_ports = RECORDING_PORTS_UNDER_ZFS;
            warn!(
                ports = ?recording_ports,
                "recording adapters in use, AddRecovery activation and CreatePool will not touch the host"
            );
        }

        if let Some(path) = &config.dev_fixture {
            let fixture = DevFixture::load(path)
                .with_context(|| format!("loading fixture {}", path.display()))?;
            fixture.apply(&memory)?;
            info!(path = %path.display(), "development fixture applied");
        }

        let container = Arc::new(Container::new(backends));

        if let Some(pool) = &config.system_pool {
            container
                .identity_api()
                .set_system_pool(pool)
                .with_context(|| format!("designating system pool {pool}"))?;
        }

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        Ok(Self {
            config,
            container,
            recording_ports,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Ports served by recording adapters although a host backend was chosen.
    pub fn recording_ports(&self) -> &[&'static str] {
        self.recording_ports
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let server = SocketServer::new(self.config.socket_path.clone(), self.container.dispatcher());
        let shutdown = self.shutdown_rx.clone();
        let task = tokio::spawn(async move { server.serve(shutdown).await });

        info!(socket = %self.config.socket_path.display(), "keybroker running, Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        info!("shutting down");
        let _ = self.shutdown_tx.send(true);

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "socket server task failed");
                Err(e.into())
            }
        }
    }
}
