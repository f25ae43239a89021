#![allow(dead_code)]

pub use pacekeeper_test_utils::builders;
pub use pacekeeper_test_utils::fake_backend;
pub use pacekeeper_test_utils::{capture_logs, init_tracing, with_timeout};

use std::path::Path;
use std::time::Duration;

/// Poll until `path` exists, for at most 5 seconds.
pub async fn wait_for_file(path: &Path) {
    for _ in 0..500 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{} did not appear", path.display());
}

/// Read a pid written by a test worker.
pub fn read_pid(path: &Path) -> i32 {
    std::fs::read_to_string(path)
        .expect("reading pid file")
        .trim()
        .parse()
        .expect("pid file contains a number")
}

/// True if `pid` no longer runs (gone, or a zombie nobody reaped yet).
pub fn process_gone(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    if kill(Pid::from_raw(pid), None).is_err() {
        return true;
    }
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .map(|rest| rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => true,
    }
}

/// Poll until `pid` is gone, for at most 5 seconds.
pub async fn wait_until_gone(pid: i32) {
    for _ in 0..500 {
        if process_gone(pid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("process {pid} is still running");
}
