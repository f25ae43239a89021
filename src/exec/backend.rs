// src/exec/backend.rs

//! Pluggable worker backend abstraction.
//!
//! The runtime talks to a `WorkerBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation in [`process`](super::process).
//!
//! - `ProcessManager` is the implementation used by `pacekeeper`. It starts
//!   each worker as its own process group and reports exits as
//!   `RuntimeEvent::WorkerExited`.
//! - Tests provide their own `WorkerBackend` that, for example, records
//!   spawn/kill calls and emits exit events on demand.

use crate::engine::WorkerId;
use crate::errors::Result;

/// Trait abstracting how workers are started and stopped.
///
/// Calls are made from the supervisor loop and must not block on the worker:
/// `spawn` returns once the process exists, `kill` once the signal has been
/// delivered to the OS. Exactly one `WorkerExited` event must eventually be
/// sent for every successful `spawn`.
pub trait WorkerBackend: Send {
    /// Start worker `worker` with the given speed argument.
    ///
    /// On error no worker exists and no exit event will follow.
    fn spawn(&mut self, worker: WorkerId, speed: u32) -> Result<()>;

    /// Ask the worker's entire process tree to terminate.
    ///
    /// Killing a worker that already exited is not an error.
    fn kill(&mut self, worker: WorkerId) -> Result<()>;

    /// Forget a worker whose exit event has been processed.
    fn release(&mut self, _worker: WorkerId) {}
}
