//! # ZFS Command-Line Backend
//!
//! Answers storage queries and loads keys by running the `zpool` and `zfs`
//! tools. Calls are blocking; the transport runs dispatch on a blocking
//! worker.
//!
//! | Port call | Command |
//! |-----------|---------|
//! | `pool_exists` | `zpool list -H -o name <pool>` |
//! | `dataset_status` | `zfs get -H -p -o value encryption,keystatus <ds>` |
//! | `load_key` | `zfs load-key -L prompt <ds>`, key on stdin |

use shared_storage::{
    errno, DatasetStatus, KeyLoadOutcome, KeyLoader, StorageBackend, StorageError, SystemError,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, trace};

/// Output of one finished tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZfsCliBackend {
    zfs: PathBuf,
    zpool: PathBuf,
}

impl ZfsCliBackend {
    pub fn new(zfs: impl AsRef<Path>, zpool: impl AsRef<Path>) -> Self {
        Self {
            zfs: zfs.as_ref().to_path_buf(),
            zpool: zpool.as_ref().to_path_buf(),
        }
    }

    fn run(program: &Path, args: &[&str], stdin: Option<&[u8]>) -> Result<ToolOutput, SystemError> {
        let operation = program.display().to_string();
        trace!(program = %operation, ?args, "running");

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SystemError::from_io(&operation, &e))?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            if let Err(e) = pipe.write_all(input) {
                drop(pipe);
                // Reap the child before reporting the failed write.
                let _ = child.kill();
                let _ = child.wait();
                return Err(SystemError::from_io(&operation, &e));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SystemError::from_io(&operation, &e))?;
        Ok(output.into())
    }
}

impl StorageBackend for ZfsCliBackend {
    fn pool_exists(&mut self, pool: &str) -> Result<bool, StorageError> {
        Self::run(&self.zpool, &["list", "-H", "-o", "name", pool], None)
            .and_then(|out| parse_pool_list(&out))
            .map_err(|source| StorageError::PoolQuery {
                pool: pool.to_string(),
                source,
            })
    }

    fn dataset_status(&mut self, dataset: &str) -> Result<DatasetStatus, StorageError> {
        Self::run(
            &self.zfs,
            &["get", "-H", "-p", "-o", "value", "encryption,keystatus", dataset],
            None,
        )
        .and_then(|out| parse_dataset_status(&out))
        .map_err(|source| StorageError::DatasetOpen {
            dataset: dataset.to_string(),
            source,
        })
    }
}

impl KeyLoader for ZfsCliBackend {
    fn load_key(&self, dataset: &str, key: &[u8]) -> Result<KeyLoadOutcome, StorageError> {
        let outcome = Self::run(&self.zfs, &["load-key", "-L", "prompt", dataset], Some(key))
            .and_then(|out| parse_load_key(&out))
            .map_err(|source| StorageError::KeyLoad {
                dataset: dataset.to_string(),
                source,
            })?;
        debug!(dataset, ?outcome, "zfs load-key finished");
        Ok(outcome)
    }
}

// =============================================================================
// OUTPUT PARSING
// =============================================================================

fn failure(operation: &str, out: &ToolOutput, errno: Option<i32>) -> SystemError {
    let message = if out.stderr.is_empty() {
        format!("exited with status {}", out.code.map_or("signal".into(), |c| c.to_string()))
    } else {
        out.stderr.clone()
    };
    SystemError::new(operation, errno, message)
}

/// Exit status 1 with "no such pool" on stderr means the pool is absent.
pub fn parse_pool_list(out: &ToolOutput) -> Result<bool, SystemError> {
    if out.success {
        return Ok(!out.stdout.trim().is_empty());
    }
    if out.code == Some(1) && out.stderr.contains("no such pool") {
        return Ok(false);
    }
    Err(failure("zpool list", out, Some(errno::EIO)))
}

/// Two lines: the `encryption` value, then the `keystatus` value.
pub fn parse_dataset_status(out: &ToolOutput) -> Result<DatasetStatus, SystemError> {
    if !out.success {
        let errno = out
            .stderr
            .contains("dataset does not exist")
            .then_some(errno::ENOENT)
            .or(Some(errno::EIO));
        return Err(failure("zfs get", out, errno));
    }

    let mut values = out.stdout.lines().map(str::trim);
    let (Some(encryption), Some(keystatus)) = (values.next(), values.next()) else {
        return Err(SystemError::new(
            "zfs get",
            Some(errno::EINVAL),
            format!("unexpected output {:?}", out.stdout),
        ));
    };
    trace!(encryption, keystatus, "dataset properties");

    if encryption == "off" || encryption == "-" {
        return Ok(DatasetStatus::UNENCRYPTED);
    }
    match keystatus {
        "available" => Ok(DatasetStatus::encrypted(false)),
        "unavailable" => Ok(DatasetStatus::encrypted(true)),
        other => Err(SystemError::new(
            "zfs get",
            Some(errno::EINVAL),
            format!("unexpected keystatus '{other}'"),
        )),
    }
}

/// "Key already loaded" on stderr counts as success.
pub fn parse_load_key(out: &ToolOutput) -> Result<KeyLoadOutcome, SystemError> {
    if out.success {
        return Ok(KeyLoadOutcome::Loaded);
    }
    if out.stderr.to_ascii_lowercase().contains("already loaded") {
        return Ok(KeyLoadOutcome::AlreadyLoaded);
    }
    let errno = if out.stderr.contains("Incorrect key") {
        errno::EACCES
    } else {
        errno::EIO
    };
    Err(failure("zfs load-key", out, Some(errno)))
}
