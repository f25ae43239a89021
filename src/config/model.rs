// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::schedule::SpeedTable;
use crate::types::SpeedValue;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [agent]
/// lock_file = "/var/run/1000/pacekeeper.pid"
/// poll_interval = "5s"
///
/// [schedule]
/// path = "scheduler.conf"
/// speeds = ["stop", 20, 0]
///
/// [worker]
/// cmd = "/usr/bin/python test.py {speed}"
/// kill_timeout = "10s"
/// ```
///
/// Only `[worker]` is required. This is the unvalidated form; see
/// [`AgentConfig`] for what the rest of the crate consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAgentConfig {
    #[serde(default)]
    pub agent: AgentSection,

    #[serde(default)]
    pub schedule: ScheduleSection,

    pub worker: WorkerSection,
}

/// `[agent]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    /// Instance lock location. Defaults to `/var/run/<uid>/pacekeeper.pid`.
    #[serde(default)]
    pub lock_file: Option<PathBuf>,

    /// How often the schedule document is re-read (e.g. `"5s"`).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

fn default_poll_interval() -> String {
    "5s".to_string()
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            lock_file: None,
            poll_interval: default_poll_interval(),
        }
    }
}

/// `[schedule]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSection {
    /// Schedule document path, relative to the config file's directory.
    #[serde(default = "default_schedule_path")]
    pub path: PathBuf,

    /// Button code -> speed lookup table, indexed by button code.
    #[serde(default = "default_speeds")]
    pub speeds: Vec<SpeedValue>,
}

fn default_schedule_path() -> PathBuf {
    PathBuf::from("scheduler.conf")
}

fn default_speeds() -> Vec<SpeedValue> {
    vec![SpeedValue::Stop, SpeedValue::Active(20), SpeedValue::Active(0)]
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            path: default_schedule_path(),
            speeds: default_speeds(),
        }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Shell command for the worker. `{speed}` is replaced by the speed
    /// argument; without a placeholder the argument is appended.
    pub cmd: String,

    /// Grace period between SIGTERM and SIGKILL for the worker's process
    /// group. No escalation when unset.
    #[serde(default)]
    pub kill_timeout: Option<String>,
}

/// Validated agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub lock_file: PathBuf,
    pub poll_interval: Duration,
    pub schedule_path: PathBuf,
    pub speeds: SpeedTable,
    pub worker: WorkerSpec,
}

/// How to launch (and tear down) a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub cmd: String,
    pub kill_timeout: Option<Duration>,
}

impl WorkerSpec {
    const PLACEHOLDER: &'static str = "{speed}";

    /// The shell command line for a worker running at `speed`.
    pub fn command_line(&self, speed: u32) -> String {
        if self.cmd.contains(Self::PLACEHOLDER) {
            self.cmd.replace(Self::PLACEHOLDER, &speed.to_string())
        } else {
            format!("{} {}", self.cmd.trim_end(), speed)
        }
    }
}
