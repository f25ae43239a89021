// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lock;
pub mod logging;
pub mod schedule;
pub mod signals;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::AgentConfig;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::Result;
use crate::exec::ProcessManager;
use crate::fs::{FileSystem, RealFileSystem};
use crate::lock::{InstanceLock, LockOutcome};
use crate::schedule::{spawn_schedule_poller, FileSchedule, SpeedSource};
use crate::signals::spawn_signal_listener;

/// Extra time, past `worker.kill_timeout`, that shutdown waits for killed
/// workers to be reaped.
const SHUTDOWN_MARGIN: Duration = Duration::from_secs(1);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - SIGINT / SIGTERM handling
/// - [`supervise`] (lock, schedule poller, process manager, runtime)
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone();
    let mut cfg = load_and_validate(&config_path)?;
    if let Some(lock_file) = args.lock_file {
        cfg.lock_file = PathBuf::from(lock_file);
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.dry_run {
        return print_dry_run(&cfg, fs);
    }

    info!(config = ?config_path, "pacekeeper agent starting");

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let _signals = spawn_signal_listener(rt_tx.clone())?;

    supervise(cfg, fs, rt_tx, rt_rx).await
}

/// Run one supervisor instance until shutdown.
///
/// The caller owns the event channel so it can inject events (the signal
/// listener does, and so do tests). Returns `Ok(())` without supervising
/// anything when another instance holds the lock. The lock is released on
/// every return path.
pub async fn supervise(
    cfg: AgentConfig,
    fs: Arc<dyn FileSystem>,
    rt_tx: mpsc::Sender<RuntimeEvent>,
    rt_rx: mpsc::Receiver<RuntimeEvent>,
) -> Result<()> {
    let _lock = match InstanceLock::acquire(fs.clone(), &cfg.lock_file)? {
        LockOutcome::Acquired(lock) => lock,
        LockOutcome::AlreadyRunning { path, holder } => {
            println!(
                "Lock file {} exists (pid {}). Another instance is running; exiting",
                path.display(),
                holder.as_deref().unwrap_or("unknown")
            );
            return Ok(());
        }
    };

    let source = Arc::new(FileSchedule::new(
        fs,
        cfg.schedule_path.clone(),
        cfg.speeds.clone(),
    ));
    let poller = spawn_schedule_poller(source, cfg.poll_interval, rt_tx.clone());

    let mut backend = ProcessManager::new(cfg.worker.clone(), rt_tx);
    let drain = backend.take_watcher_drain();
    let runtime = Runtime::new(CoreRuntime::new(), rt_rx, backend);
    let result = runtime.run().await;

    poller.abort();

    // The SIGKILL escalation lives in the exit watchers, which die with the
    // Tokio runtime once we return.
    if let (Some(grace), Some(drain)) = (cfg.worker.kill_timeout, drain) {
        let limit = grace + SHUTDOWN_MARGIN;
        if timeout(limit, drain.wait()).await.is_err() {
            warn!(limit = ?limit, "worker processes still exiting; giving up on them");
        }
    }

    result
}

/// Dry-run output: config summary, the speed for "now" and the command that
/// would be started.
fn print_dry_run(cfg: &AgentConfig, fs: Arc<dyn FileSystem>) -> Result<()> {
    println!("pacekeeper dry-run");
    println!("  agent.lock_file = {}", cfg.lock_file.display());
    println!("  agent.poll_interval = {:?}", cfg.poll_interval);
    println!("  schedule.path = {}", cfg.schedule_path.display());
    let speeds: Vec<String> = cfg.speeds.iter().map(|s| s.to_string()).collect();
    println!("  schedule.speeds = [{}]", speeds.join(", "));
    println!("  worker.cmd = {}", cfg.worker.cmd);
    if let Some(grace) = cfg.worker.kill_timeout {
        println!("  worker.kill_timeout = {grace:?}");
    }
    println!();

    let schedule = FileSchedule::new(fs, cfg.schedule_path.clone(), cfg.speeds.clone());
    let now = Local::now().naive_local();
    let speed = schedule.speed_at(now)?;

    println!("speed at {now}: {speed}");
    match speed.argument() {
        Some(arg) => println!("would run: sh -c {:?}", cfg.worker.command_line(arg)),
        None => println!("no worker would run"),
    }

    Ok(())
}
