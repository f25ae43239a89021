// src/engine/mod.rs

//! Supervisor engine for pacekeeper.
//!
//! The runtime event loop reacts to:
//! - speed readings from the schedule poller
//! - worker exit notifications from the process manager
//! - shutdown signals
//! - fatal schedule failures
//!
//! The pure supervisor state machine lives in [`core`] (state in [`state`],
//! per-event transitions in [`event_handlers`]); the async/IO shell is
//! implemented in [`runtime`].

use crate::types::SpeedValue;

/// Identity of one spawned worker. Never reused within a supervisor.
pub type WorkerId = u64;

/// How a worker process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    Success,
    Failed(i32),
    /// Terminated by a signal (number).
    Signaled(i32),
}

/// Events flowing into the runtime from the poller, workers and signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The schedule's current desired speed. Repeats on every poll.
    SpeedReading(SpeedValue),
    /// A worker process terminated, for any reason.
    WorkerExited {
        worker: WorkerId,
        outcome: WorkerOutcome,
    },
    /// The schedule could not be evaluated; the agent must stop.
    ScheduleFailed { reason: String },
    /// Graceful shutdown requested (SIGINT / SIGTERM).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod state;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use state::{LiveWorker, SupervisorState};
