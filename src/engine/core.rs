// src/engine/core.rs

//! Pure core supervisor state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated supervisor state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the channel
//! - spawning and killing workers through a `WorkerBackend`
//! - reporting spawn failures back via [`CoreRuntime::spawn_failed`]
//!
//! The core is unit tested without any Tokio, channels, filesystem, or
//! processes.

use tracing::warn;

use crate::engine::event_handlers::{
    handle_schedule_failure, handle_shutdown, handle_speed_reading, handle_worker_exit,
    CoreStep,
};
use crate::engine::state::{LiveWorker, SupervisorState};
use crate::engine::{RuntimeEvent, WorkerId};
use crate::types::SpeedValue;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
/// Each instance is an independent supervisor.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    state: SupervisorState,
    finished: bool,
}

impl CoreRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no worker is current (state `IDLE`).
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn desired(&self) -> Option<SpeedValue> {
        self.state.desired()
    }

    pub fn current_worker(&self) -> Option<LiveWorker> {
        self.state.current()
    }

    /// True once a shutdown or fatal failure has been handled.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn state(&self) -> &SupervisorState {
        &self.state
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    ///
    /// After a terminal event every further event is ignored.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        if self.finished {
            return CoreStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        let step = match event {
            RuntimeEvent::SpeedReading(speed) => handle_speed_reading(&mut self.state, speed),
            RuntimeEvent::WorkerExited { worker, outcome } => {
                handle_worker_exit(&mut self.state, worker, outcome)
            }
            RuntimeEvent::ScheduleFailed { reason } => {
                handle_schedule_failure(&mut self.state, reason)
            }
            RuntimeEvent::ShutdownRequested => handle_shutdown(&mut self.state),
        };

        if !step.keep_running {
            self.finished = true;
        }
        step
    }

    /// The shell could not start `worker`: go back to idle so the next
    /// reading retries.
    pub fn spawn_failed(&mut self, worker: WorkerId) {
        if self.state.forget_current(worker).is_none() {
            warn!(worker, "spawn failure reported for a worker that is not current");
        }
    }
}
