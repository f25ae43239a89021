use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use pacekeeper::engine::{RuntimeEvent, WorkerId, WorkerOutcome};
use pacekeeper::errors::{PacekeeperError, Result};
use pacekeeper::exec::WorkerBackend;

/// One call made by the runtime into the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Spawn { worker: WorkerId, speed: u32 },
    Kill { worker: WorkerId },
    Release { worker: WorkerId },
}

/// Shared view of what a [`FakeWorkerBackend`] was asked to do.
///
/// Cloned into the test before the backend is moved into the runtime.
#[derive(Debug, Clone, Default)]
pub struct BackendRecorder {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    failing_spawns: Arc<Mutex<usize>>,
}

impl BackendRecorder {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Spawn and kill calls only, in order.
    pub fn actions(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, BackendCall::Release { .. }))
            .collect()
    }

    pub fn spawned_speeds(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Spawn { speed, .. } => Some(speed),
                _ => None,
            })
            .collect()
    }

    pub fn kill_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::Kill { .. }))
            .count()
    }

    /// Make the next `n` spawn calls fail.
    pub fn fail_next_spawns(&self, n: usize) {
        *self.failing_spawns.lock().unwrap() = n;
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_failure(&self) -> bool {
        let mut failing = self.failing_spawns.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            true
        } else {
            false
        }
    }
}

/// A fake backend that:
/// - records every spawn / kill / release
/// - optionally fails spawns on demand
/// - reports a killed worker as exited (`Signaled(15)`), like a real worker
///   honouring SIGTERM, when `exit_on_kill` is on.
pub struct FakeWorkerBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    recorder: BackendRecorder,
    exit_on_kill: bool,
}

impl FakeWorkerBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            recorder: BackendRecorder::default(),
            exit_on_kill: true,
        }
    }

    /// Keep killed workers "alive" until the test sends their exit itself.
    pub fn without_exit_on_kill(mut self) -> Self {
        self.exit_on_kill = false;
        self
    }

    pub fn recorder(&self) -> BackendRecorder {
        self.recorder.clone()
    }
}

impl WorkerBackend for FakeWorkerBackend {
    fn spawn(&mut self, worker: WorkerId, speed: u32) -> Result<()> {
        if self.recorder.take_failure() {
            return Err(PacekeeperError::SpawnError(format!(
                "injected spawn failure for worker {worker}"
            )));
        }
        self.recorder.record(BackendCall::Spawn { worker, speed });
        Ok(())
    }

    fn kill(&mut self, worker: WorkerId) -> Result<()> {
        self.recorder.record(BackendCall::Kill { worker });

        if self.exit_on_kill {
            let tx = self.runtime_tx.clone();
            tokio::spawn(async move {
                let _ = tx
                    .send(RuntimeEvent::WorkerExited {
                        worker,
                        outcome: WorkerOutcome::Signaled(15),
                    })
                    .await;
            });
        }
        Ok(())
    }

    fn release(&mut self, worker: WorkerId) {
        self.recorder.record(BackendCall::Release { worker });
    }
}
