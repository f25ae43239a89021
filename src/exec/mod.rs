// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the worker command,
//! using `tokio::process::Command`, and reporting back to the supervisor
//! runtime via `RuntimeEvent`s.
//!
//! - [`backend`] provides the `WorkerBackend` trait the runtime drives, and
//!   which tests replace with a fake implementation.
//! - [`process`] is the production backend (`ProcessManager`).
//! - [`waiter`] watches one worker until it exits, escalating to SIGKILL if
//!   configured.
//! - [`group`] sends signals to whole process groups.
//! - [`output`] forwards worker stdout/stderr into the log.

pub mod backend;
pub mod group;
pub mod output;
pub mod process;
pub mod waiter;

pub use backend::WorkerBackend;
pub use group::signal_group;
pub use process::{ProcessManager, WatcherDrain};
