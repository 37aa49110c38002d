//! # Daemon Configuration
//!
//! Environment-driven settings for the socket, the storage backend and
//! startup state.

use kb_telemetry::TelemetryConfig;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SOCKET_PATH: &str = "/var/run/keybroker/keybroker.sock";
pub const DEFAULT_ZFS_BIN: &str = "/usr/sbin/zfs";
pub const DEFAULT_ZPOOL_BIN: &str = "/usr/sbin/zpool";

/// Which storage backend answers pool, dataset and key-load queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Memory,
    Zfs,
}

impl std::str::FromStr for StorageBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackendKind::Memory),
            "zfs" => Ok(StorageBackendKind::Zfs),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Unix socket clients connect to.
    pub socket_path: PathBuf,
    /// Storage backend name, `memory` or `zfs`.
    pub backend: String,
    pub zfs_bin: PathBuf,
    pub zpool_bin: PathBuf,
    /// Pool designated as the system pool at startup.
    pub system_pool: Option<String>,
    /// JSON fixture seeding the in-memory backends.
    pub dev_fixture: Option<PathBuf>,
    pub telemetry: TelemetryConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            backend: "memory".to_string(),
            zfs_bin: PathBuf::from(DEFAULT_ZFS_BIN),
            zpool_bin: PathBuf::from(DEFAULT_ZPOOL_BIN),
            system_pool: None,
            dev_fixture: None,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KB_SOCKET_PATH`: Socket path (default: /var/run/keybroker/keybroker.sock)
    /// - `KB_STORAGE_BACKEND`: `memory` or `zfs` (default: memory)
    /// - `KB_ZFS_BIN`, `KB_ZPOOL_BIN`: ZFS tool paths
    /// - `KB_SYSTEM_POOL`: Pool to designate at startup
    /// - `KB_DEV_FIXTURE`: Development fixture path
    /// - Telemetry variables, see [`TelemetryConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            socket_path: lookup("KB_SOCKET_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.socket_path),
            backend: lookup("KB_STORAGE_BACKEND").unwrap_or(defaults.backend),
            zfs_bin: non_empty("KB_ZFS_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.zfs_bin),
            zpool_bin: non_empty("KB_ZPOOL_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.zpool_bin),
            system_pool: non_empty("KB_SYSTEM_POOL"),
            dev_fixture: non_empty("KB_DEV_FIXTURE").map(PathBuf::from),
            telemetry: TelemetryConfig::from_lookup(&lookup),
        }
    }

    pub fn backend_kind(&self) -> Result<StorageBackendKind, ConfigError> {
        self.backend.parse()
    }

    /// Check the configuration before anything is built.
    ///
    /// # Errors
    ///
    /// - `EmptySocketPath`: no socket path
    /// - `UnknownBackend`: backend is neither `memory` nor `zfs`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySocketPath);
        }
        self.backend_kind()?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("socket path is empty; set KB_SOCKET_PATH")]
    EmptySocketPath,

    #[error("unknown storage backend '{0}', expected 'memory' or 'zfs'")]
    UnknownBackend(String),
}
