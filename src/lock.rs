// src/lock.rs

//! Single-instance guard.
//!
//! A pid file created with exclusive-create semantics. The file is removed
//! when the [`InstanceLock`] is dropped, so every exit path that unwinds
//! through `run` releases it. A SIGKILL or crash leaves a stale file behind
//! that has to be removed by hand.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{PacekeeperError, Result};
use crate::fs::FileSystem;

/// Result of trying to take the lock.
#[derive(Debug)]
pub enum LockOutcome {
    Acquired(InstanceLock),
    /// Another instance holds the lock. `holder` is the pid recorded in the
    /// file, when readable.
    AlreadyRunning {
        path: PathBuf,
        holder: Option<String>,
    },
}

/// Held for the lifetime of one agent instance.
pub struct InstanceLock {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceLock")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl InstanceLock {
    /// Try to create the lock file at `path`, storing the current pid.
    pub fn acquire(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Result<LockOutcome> {
        Self::acquire_for_pid(fs, path, std::process::id())
    }

    /// Like [`acquire`](Self::acquire) with an explicit pid.
    pub fn acquire_for_pid(
        fs: Arc<dyn FileSystem>,
        path: impl AsRef<Path>,
        pid: u32,
    ) -> Result<LockOutcome> {
        let path = path.as_ref().to_path_buf();

        match fs.create_new(&path, pid.to_string().as_bytes()) {
            Ok(()) => {
                info!(path = ?path, pid, "instance lock acquired");
                Ok(LockOutcome::Acquired(InstanceLock { fs, path }))
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let holder = fs
                    .read_to_string(&path)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                Ok(LockOutcome::AlreadyRunning { path, holder })
            }
            Err(err) => Err(PacekeeperError::IoError(io::Error::new(
                err.kind(),
                format!("creating lock file {:?}: {err}", path),
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        match self.fs.remove_file(&self.path) {
            Ok(()) => debug!(path = ?self.path, "instance lock released"),
            Err(err) => warn!(path = ?self.path, error = %err, "failed to remove instance lock"),
        }
    }
}
