// src/exec/group.rs

//! Process-group signalling.

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;

use crate::errors::{PacekeeperError, Result};

/// Send `signal` to every process in group `pgid`.
///
/// `None` sends nothing and only checks whether the group still has members.
/// Returns `Ok(false)` if the group no longer exists.
pub fn signal_group<S: Into<Option<Signal>>>(pgid: Pid, signal: S) -> Result<bool> {
    match killpg(pgid, signal) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(PacekeeperError::IoError(std::io::Error::from(errno))),
    }
}

/// True while any process of group `pgid` is left.
pub fn group_alive(pgid: Pid) -> bool {
    // EPERM means someone is there that we may not signal.
    !matches!(signal_group(pgid, None), Ok(false))
}
