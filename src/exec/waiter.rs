// src/exec/waiter.rs

//! Per-worker exit watcher.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::engine::{RuntimeEvent, WorkerId, WorkerOutcome};
use crate::exec::group::{group_alive, signal_group};

const GROUP_POLL: Duration = Duration::from_millis(25);

/// Wait for a worker to exit and send exactly one `WorkerExited` event.
///
/// `kill_rx` fires after the backend has sent SIGTERM to the group. With a
/// `kill_timeout`, whatever is left of the group after the grace period gets
/// SIGKILL, whether or not the leader is still around. If the sender is
/// dropped without firing we just keep waiting.
///
/// The event is only sent once the leader has been reaped and the rest of
/// the group has been told to terminate, so the supervisor never starts a
/// new worker next to leftovers of the old one.
pub async fn watch_worker(
    worker: WorkerId,
    mut child: Child,
    pgid: Pid,
    mut kill_rx: oneshot::Receiver<()>,
    kill_timeout: Option<Duration>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let (status, deadline) = tokio::select! {
        status = child.wait() => (status, kill_timeout.map(|grace| Instant::now() + grace)),
        requested = &mut kill_rx => {
            match (requested, kill_timeout) {
                (Ok(()), Some(grace)) => {
                    let deadline = Instant::now() + grace;
                    match timeout_at(deadline, child.wait()).await {
                        Ok(status) => (status, Some(deadline)),
                        Err(_) => {
                            force_kill(worker, pgid, grace);
                            (child.wait().await, None)
                        }
                    }
                }
                _ => (child.wait().await, None),
            }
        }
    };

    // Descendants outlive their leader unless told otherwise.
    match signal_group(pgid, Signal::SIGTERM) {
        Ok(true) => info!(worker, pgid = pgid.as_raw(), "terminating processes left behind by worker"),
        Ok(false) => {}
        Err(err) => error!(worker, error = %err, "failed to signal remaining worker processes"),
    }
    if let Some(deadline) = deadline {
        drain_group(worker, pgid, deadline, kill_timeout.unwrap_or_default()).await;
    }

    let outcome = match status {
        Ok(status) => outcome_of(status),
        Err(err) => {
            error!(worker, error = %err, "waiting for worker process failed");
            WorkerOutcome::Failed(-1)
        }
    };

    info!(worker, ?outcome, "worker process exited");

    if runtime_tx
        .send(RuntimeEvent::WorkerExited { worker, outcome })
        .await
        .is_err()
    {
        debug!(worker, "runtime gone; dropping exit notification");
    }
}

/// Wait until the group is empty, SIGKILLing it once `deadline` passes.
async fn drain_group(worker: WorkerId, pgid: Pid, deadline: Instant, grace: Duration) {
    while group_alive(pgid) {
        if Instant::now() >= deadline {
            force_kill(worker, pgid, grace);
            return;
        }
        sleep(GROUP_POLL).await;
    }
}

fn force_kill(worker: WorkerId, pgid: Pid, grace: Duration) {
    warn!(worker, pgid = pgid.as_raw(), grace = ?grace, "worker ignored SIGTERM; sending SIGKILL");
    if let Err(err) = signal_group(pgid, Signal::SIGKILL) {
        error!(worker, error = %err, "failed to SIGKILL worker process group");
    }
}

fn outcome_of(status: ExitStatus) -> WorkerOutcome {
    if status.success() {
        return WorkerOutcome::Success;
    }
    match (status.code(), status.signal()) {
        (Some(code), _) => WorkerOutcome::Failed(code),
        (None, Some(signal)) => WorkerOutcome::Signaled(signal),
        (None, None) => WorkerOutcome::Failed(-1),
    }
}
