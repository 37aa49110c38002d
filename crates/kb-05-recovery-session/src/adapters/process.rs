//! [`ProcessLiveness`] implementations.

use crate::ports::outbound::ProcessLiveness;
use parking_lot::Mutex;
use shared_types::Pid;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Checks for `<root>/<pid>` under a procfs mount.
///
/// Without a readable mount (`<root>/self` missing) every process is
/// reported alive, so sessions are never taken over on guesswork.
#[derive(Debug, Clone)]
pub struct ProcFsLiveness {
    root: PathBuf,
}

impl ProcFsLiveness {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for ProcFsLiveness {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLiveness for ProcFsLiveness {
    fn is_alive(&self, pid: Pid) -> bool {
        if pid <= 0 || !self.root.join("self").exists() {
            return true;
        }
        self.root.join(pid.to_string()).exists()
    }
}

/// Every process is alive unless marked exited.
#[derive(Debug, Default)]
pub struct MemoryLiveness {
    exited: Mutex<HashSet<Pid>>,
}

impl MemoryLiveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_exited(&self, pid: Pid) {
        self.exited.lock().insert(pid);
    }
}

impl ProcessLiveness for MemoryLiveness {
    fn is_alive(&self, pid: Pid) -> bool {
        !self.exited.lock().contains(&pid)
    }
}
