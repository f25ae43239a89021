// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::{PacekeeperError, Result};
use crate::exec::WorkerBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the supervisor core in response to `RuntimeEvent`s and delegates
/// process handling to a `WorkerBackend`.
///
/// The event channel is the loop's only suspension point; spawning and
/// killing are synchronous calls that return once the OS has been asked.
pub struct Runtime<B: WorkerBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    failure: Option<String>,
}

impl<B: WorkerBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: WorkerBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
            failure: None,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`, one at a time.
    /// - Feeds them into the core.
    /// - Executes the commands returned by the core.
    ///
    /// Returns `Ok(())` after a shutdown (or when every sender is gone) and
    /// [`PacekeeperError::ScheduleError`] after a fatal schedule failure.
    pub async fn run(mut self) -> Result<()> {
        info!("supervisor runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        match self.failure.take() {
            Some(reason) => Err(PacekeeperError::ScheduleError(reason)),
            None => {
                info!("runtime exiting");
                Ok(())
            }
        }
    }

    /// Execute a single command from the core.
    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::SpawnWorker { worker, speed } => {
                if let Err(err) = self.backend.spawn(worker, speed) {
                    error!(worker, speed, error = %err, "failed to spawn worker; will retry on next reading");
                    self.core.spawn_failed(worker);
                }
            }
            CoreCommand::KillWorker { worker } => {
                if let Err(err) = self.backend.kill(worker) {
                    warn!(worker, error = %err, "failed to signal worker process group");
                }
            }
            CoreCommand::ReleaseWorker { worker } => {
                self.backend.release(worker);
            }
            CoreCommand::Abort { reason } => {
                self.failure = Some(reason);
            }
        }
    }
}
