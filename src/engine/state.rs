// src/engine/state.rs

//! Supervisor bookkeeping.
//!
//! Tracks the desired speed, the single *current* worker and the workers
//! that were told to terminate but whose exit has not been observed yet.
//! Only the handlers in [`event_handlers`](super::event_handlers) mutate it.

use std::collections::BTreeSet;

use crate::engine::WorkerId;
use crate::types::SpeedValue;

/// The worker the supervisor currently reconciles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveWorker {
    pub id: WorkerId,
    /// Speed argument the worker was spawned with.
    pub speed: u32,
}

#[derive(Debug, Default)]
pub struct SupervisorState {
    desired: Option<SpeedValue>,
    current: Option<LiveWorker>,
    /// Workers killed by us and not yet confirmed exited.
    pending_kill: BTreeSet<WorkerId>,
    next_worker: WorkerId,
}

impl SupervisorState {
    /// Last speed seen from the schedule; `None` before the first reading.
    pub fn desired(&self) -> Option<SpeedValue> {
        self.desired
    }

    pub fn set_desired(&mut self, speed: SpeedValue) {
        self.desired = Some(speed);
    }

    pub fn current(&self) -> Option<LiveWorker> {
        self.current
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_pending_kill(&self, worker: WorkerId) -> bool {
        self.pending_kill.contains(&worker)
    }

    /// Register a new current worker for `speed` and return its id.
    ///
    /// Callers must have retired the previous current worker first.
    pub fn start_worker(&mut self, speed: u32) -> WorkerId {
        debug_assert!(self.current.is_none(), "a current worker is still registered");
        let id = self.next_worker;
        self.next_worker += 1;
        self.current = Some(LiveWorker { id, speed });
        id
    }

    /// Retire the current worker as supervisor-killed (sets PendingKill).
    pub fn retire_current(&mut self) -> Option<LiveWorker> {
        let worker = self.current.take()?;
        self.pending_kill.insert(worker.id);
        Some(worker)
    }

    /// Clear the PendingKill flag for `worker`; true if it was set.
    pub fn clear_pending_kill(&mut self, worker: WorkerId) -> bool {
        self.pending_kill.remove(&worker)
    }

    /// Drop the current worker if it is `worker`, without marking a kill.
    pub fn forget_current(&mut self, worker: WorkerId) -> Option<LiveWorker> {
        match self.current {
            Some(live) if live.id == worker => self.current.take(),
            _ => None,
        }
    }
}
