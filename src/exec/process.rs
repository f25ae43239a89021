// src/exec/process.rs

//! Production worker backend.

use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::process::Stdio;

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::WorkerSpec;
use crate::engine::{RuntimeEvent, WorkerId};
use crate::errors::{PacekeeperError, Result};
use crate::exec::backend::WorkerBackend;
use crate::exec::group::signal_group;
use crate::exec::output::{forward_output, Stream};
use crate::exec::waiter::watch_worker;

/// Bookkeeping for a spawned worker.
///
/// - `pgid` is the worker's process group (equal to its pid: every worker is
///   a group leader).
/// - `kill_notify` tells the exit watcher a SIGTERM went out, which starts
///   the optional escalation timer. `None` once used.
struct WorkerEntry {
    pgid: Pid,
    kill_notify: Option<oneshot::Sender<()>>,
}

/// Resolves once every exit watcher started by a [`ProcessManager`] has
/// finished and the manager itself is gone.
///
/// Each watcher holds a clone of the sender; nothing is ever sent, so the
/// receiver yields `None` when the last clone is dropped.
#[derive(Debug)]
pub struct WatcherDrain {
    rx: mpsc::Receiver<()>,
}

impl WatcherDrain {
    pub async fn wait(mut self) {
        while self.rx.recv().await.is_some() {}
    }
}

/// Spawns workers as process-group leaders and reports their exits.
///
/// Each worker runs `sh -c <cmd>`; its exit is observed by a dedicated Tokio
/// task so the supervisor loop never waits on a process.
pub struct ProcessManager {
    spec: WorkerSpec,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    workers: HashMap<WorkerId, WorkerEntry>,
    watchers: mpsc::Sender<()>,
    drain: Option<WatcherDrain>,
}

impl ProcessManager {
    pub fn new(spec: WorkerSpec, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        let (watchers, rx) = mpsc::channel::<()>(1);
        Self {
            spec,
            runtime_tx,
            workers: HashMap::new(),
            watchers,
            drain: Some(WatcherDrain { rx }),
        }
    }

    /// Handle for waiting on outstanding exit watchers after the manager has
    /// been dropped. Only the first call returns it.
    pub fn take_watcher_drain(&mut self) -> Option<WatcherDrain> {
        self.drain.take()
    }

    /// Process group of a worker that has not been released yet.
    pub fn process_group(&self, worker: WorkerId) -> Option<Pid> {
        self.workers.get(&worker).map(|entry| entry.pgid)
    }

    fn build_command(&self, speed: u32) -> Command {
        let mut std_cmd = std::process::Command::new("sh");
        std_cmd.arg("-c").arg(self.spec.command_line(speed));

        // New process group led by the worker, so killpg reaches every
        // descendant.
        std_cmd.process_group(0);

        let mut cmd = Command::from(std_cmd);
        // No kill_on_drop: teardown is done by group signals.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);
        cmd
    }
}

impl WorkerBackend for ProcessManager {
    fn spawn(&mut self, worker: WorkerId, speed: u32) -> Result<()> {
        let command_line = self.spec.command_line(speed);
        let mut child = self
            .build_command(speed)
            .spawn()
            .map_err(|e| {
                PacekeeperError::SpawnError(format!("worker {worker} ({command_line}): {e}"))
            })?;

        let pid = child.id().ok_or_else(|| {
            PacekeeperError::SpawnError(format!("worker {worker} exited before reporting a pid"))
        })?;
        let pgid = Pid::from_raw(pid as i32);

        info!(worker, speed, pid, cmd = %command_line, "spawned worker process");

        if let Some(stdout) = child.stdout.take() {
            forward_output(worker, Stream::Stdout, stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(worker, Stream::Stderr, stderr);
        }

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let watcher = watch_worker(
            worker,
            child,
            pgid,
            kill_rx,
            self.spec.kill_timeout,
            self.runtime_tx.clone(),
        );
        let token = self.watchers.clone();
        tokio::spawn(async move {
            watcher.await;
            drop(token);
        });

        self.workers.insert(
            worker,
            WorkerEntry {
                pgid,
                kill_notify: Some(kill_tx),
            },
        );
        Ok(())
    }

    fn kill(&mut self, worker: WorkerId) -> Result<()> {
        let Some(entry) = self.workers.get_mut(&worker) else {
            debug!(worker, "kill requested for unknown worker; ignoring");
            return Ok(());
        };

        info!(worker, pgid = entry.pgid.as_raw(), "sending SIGTERM to worker process group");
        if !signal_group(entry.pgid, Signal::SIGTERM)? {
            debug!(worker, "worker process group already gone");
        }

        if let Some(notify) = entry.kill_notify.take() {
            if notify.send(()).is_err() {
                debug!(worker, "worker already exited while killing");
            }
        }
        Ok(())
    }

    fn release(&mut self, worker: WorkerId) {
        self.workers.remove(&worker);
    }
}
