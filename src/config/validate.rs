// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use nix::unistd::getuid;

use crate::config::duration::parse_duration;
use crate::config::model::{AgentConfig, RawAgentConfig, WorkerSpec};
use crate::errors::{PacekeeperError, Result};
use crate::schedule::SpeedTable;

impl TryFrom<RawAgentConfig> for AgentConfig {
    type Error = PacekeeperError;

    fn try_from(raw: RawAgentConfig) -> std::result::Result<Self, Self::Error> {
        let poll_interval = validate_poll_interval(&raw)?;
        let kill_timeout = validate_worker(&raw)?;
        let speeds = validate_speeds(&raw)?;

        let lock_file = raw
            .agent
            .lock_file
            .unwrap_or_else(default_lock_file);

        Ok(AgentConfig {
            lock_file,
            poll_interval,
            schedule_path: raw.schedule.path,
            speeds,
            worker: WorkerSpec {
                cmd: raw.worker.cmd,
                kill_timeout,
            },
        })
    }
}

/// `/var/run/<uid>/pacekeeper.pid`
pub fn default_lock_file() -> PathBuf {
    PathBuf::from(format!("/var/run/{}/pacekeeper.pid", getuid()))
}

fn validate_poll_interval(cfg: &RawAgentConfig) -> Result<Duration> {
    let interval = parse_duration(&cfg.agent.poll_interval).map_err(|e| {
        PacekeeperError::ConfigError(format!("[agent].poll_interval: {e}"))
    })?;

    if interval.is_zero() {
        return Err(PacekeeperError::ConfigError(
            "[agent].poll_interval must be greater than zero".to_string(),
        ));
    }
    Ok(interval)
}

fn validate_worker(cfg: &RawAgentConfig) -> Result<Option<Duration>> {
    if cfg.worker.cmd.trim().is_empty() {
        return Err(PacekeeperError::ConfigError(
            "[worker].cmd must not be empty".to_string(),
        ));
    }

    cfg.worker
        .kill_timeout
        .as_deref()
        .map(|s| {
            parse_duration(s).map_err(|e| {
                PacekeeperError::ConfigError(format!("[worker].kill_timeout: {e}"))
            })
        })
        .transpose()
}

fn validate_speeds(cfg: &RawAgentConfig) -> Result<SpeedTable> {
    if cfg.schedule.speeds.is_empty() {
        return Err(PacekeeperError::ConfigError(
            "[schedule].speeds must contain at least one entry".to_string(),
        ));
    }
    Ok(SpeedTable::new(cfg.schedule.speeds.clone()))
}
