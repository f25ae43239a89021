// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, error, info, warn};

use crate::engine::state::SupervisorState;
use crate::engine::{WorkerId, WorkerOutcome};
use crate::types::SpeedValue;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a worker with the given speed argument.
    SpawnWorker { worker: WorkerId, speed: u32 },
    /// Signal the worker's whole process group to terminate.
    KillWorker { worker: WorkerId },
    /// The worker's exit was observed; the backend may drop its bookkeeping.
    ReleaseWorker { worker: WorkerId },
    /// Stop the agent with a fatal error.
    Abort { reason: String },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn terminal(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Handle a speed reading from the schedule.
///
/// - Same value as before with a live worker (or a repeated `Stop`): no-op.
/// - Changed value while a worker runs: kill it (PendingKill).
/// - `Active(v)` with no current worker: spawn one. This also covers an
///   unchanged reading after a spontaneous exit or a failed spawn.
pub fn handle_speed_reading(state: &mut SupervisorState, speed: SpeedValue) -> CoreStep {
    let mut commands = Vec::new();

    let changed = state.desired() != Some(speed);
    if !changed && (!state.is_idle() || speed.is_stop()) {
        debug!(%speed, "speed unchanged; nothing to do");
        return CoreStep::running(commands);
    }

    if changed {
        info!(%speed, previous = ?state.desired(), "speed received");
        state.set_desired(speed);

        if let Some(stale) = state.retire_current() {
            info!(worker = stale.id, speed = stale.speed, "speed changed; killing worker");
            commands.push(CoreCommand::KillWorker { worker: stale.id });
        }
    }

    if let Some(arg) = speed.argument() {
        let worker = state.start_worker(arg);
        info!(worker, speed = arg, "starting worker");
        commands.push(CoreCommand::SpawnWorker { worker, speed: arg });
    }

    CoreStep::running(commands)
}

/// Handle a worker exit notification.
///
/// An exit we asked for is expected and silent. An exit of the current
/// worker is spontaneous: the supervisor goes idle and logs the outcome once.
/// Anything else is a stale notification and is ignored.
pub fn handle_worker_exit(
    state: &mut SupervisorState,
    worker: WorkerId,
    outcome: WorkerOutcome,
) -> CoreStep {
    let commands = vec![CoreCommand::ReleaseWorker { worker }];

    if state.clear_pending_kill(worker) {
        debug!(worker, ?outcome, "killed worker exited");
        return CoreStep::running(commands);
    }

    match state.forget_current(worker) {
        Some(live) => match outcome {
            WorkerOutcome::Success => {
                info!(worker, speed = live.speed, "worker finished successfully");
            }
            WorkerOutcome::Failed(code) => {
                warn!(worker, speed = live.speed, exit_code = code, "worker finished with error");
            }
            WorkerOutcome::Signaled(signal) => {
                warn!(worker, speed = live.speed, signal, "worker terminated by signal");
            }
        },
        None => {
            debug!(worker, ?outcome, "exit notification for unknown worker; ignoring");
        }
    }

    CoreStep::running(commands)
}

/// Handle a shutdown request: kill the current worker and stop.
pub fn handle_shutdown(state: &mut SupervisorState) -> CoreStep {
    let mut commands = Vec::new();

    if let Some(live) = state.retire_current() {
        info!(worker = live.id, speed = live.speed, "shutting down; killing worker");
        commands.push(CoreCommand::KillWorker { worker: live.id });
    } else {
        info!("shutting down; no worker running");
    }

    CoreStep::terminal(commands)
}

/// Handle an unrecoverable schedule failure: tear down like a shutdown, then
/// abort with the reason.
pub fn handle_schedule_failure(state: &mut SupervisorState, reason: String) -> CoreStep {
    error!(%reason, "schedule failure; stopping agent");

    let mut step = handle_shutdown(state);
    step.commands.push(CoreCommand::Abort { reason });
    step
}
