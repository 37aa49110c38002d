//! # Storage Errors

use shared_types::{Classified, ErrorKind};
use std::io;
use thiserror::Error;

/// System error numbers the storage layer reports on.
pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EACCES: i32 = 13;
    pub const EEXIST: i32 = 17;
    pub const EINVAL: i32 = 22;
}

/// A failure reported by the volume manager or the operating system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation}: {message}")]
pub struct SystemError {
    pub operation: String,
    pub errno: Option<i32>,
    pub message: String,
}

impl SystemError {
    pub fn new(operation: impl Into<String>, errno: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            errno,
            message: message.into(),
        }
    }

    pub fn from_io(operation: impl Into<String>, err: &io::Error) -> Self {
        Self::new(operation, err.raw_os_error(), err.to_string())
    }
}

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The pool-existence query itself failed.
    #[error("zpool_open_canfail failed for pool '{pool}'")]
    PoolQuery {
        pool: String,
        #[source]
        source: SystemError,
    },

    /// Dataset metadata could not be read.
    #[error("unable to open dataset '{dataset}'")]
    DatasetOpen {
        dataset: String,
        #[source]
        source: SystemError,
    },

    /// The key was rejected.
    #[error("unable to load key for dataset '{dataset}'")]
    KeyLoad {
        dataset: String,
        #[source]
        source: SystemError,
    },
}

impl StorageError {
    pub fn system(&self) -> &SystemError {
        match self {
            StorageError::PoolQuery { source, .. }
            | StorageError::DatasetOpen { source, .. }
            | StorageError::KeyLoad { source, .. } => source,
        }
    }
}

impl Classified for StorageError {
    fn kind(&self) -> ErrorKind {
        match self {
            StorageError::PoolQuery { .. } => ErrorKind::StorageQueryError,
            StorageError::DatasetOpen { .. } => ErrorKind::ZfsError,
            StorageError::KeyLoad { .. } => ErrorKind::KeyLoadError,
        }
    }

    fn errno(&self) -> Option<i32> {
        self.system().errno
    }
}
