// src/signals.rs

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::errors::Result;

/// Listen for SIGINT / SIGTERM and send a single `ShutdownRequested`.
///
/// The handlers stay installed after the first signal, so later signals are
/// swallowed while the supervisor tears down.
pub fn spawn_signal_listener(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Result<JoinHandle<()>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        info!(signal = name, "signal received");

        if runtime_tx.send(RuntimeEvent::ShutdownRequested).await.is_err() {
            debug!("runtime event channel closed before shutdown could be requested");
        }
    }))
}
