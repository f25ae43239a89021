#![allow(dead_code)]

use std::path::{Path, PathBuf};

use pacekeeper::config::{
    AgentConfig, AgentSection, RawAgentConfig, ScheduleSection, WorkerSection,
};
use pacekeeper::schedule::ScheduleDocument;
use pacekeeper::types::SpeedValue;

/// Builder for `AgentConfig` to simplify test setup.
pub struct AgentConfigBuilder {
    config: RawAgentConfig,
}

impl AgentConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            config: RawAgentConfig {
                agent: AgentSection::default(),
                schedule: ScheduleSection::default(),
                worker: WorkerSection {
                    cmd: cmd.to_string(),
                    kill_timeout: None,
                },
            },
        }
    }

    pub fn lock_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config.agent.lock_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.config.agent.poll_interval = interval.to_string();
        self
    }

    pub fn schedule_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.schedule.path = path.as_ref().to_path_buf();
        self
    }

    pub fn speeds(mut self, speeds: Vec<SpeedValue>) -> Self {
        self.config.schedule.speeds = speeds;
        self
    }

    pub fn kill_timeout(mut self, timeout: &str) -> Self {
        self.config.worker.kill_timeout = Some(timeout.to_string());
        self
    }

    pub fn raw(self) -> RawAgentConfig {
        self.config
    }

    pub fn build(self) -> AgentConfig {
        AgentConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Builder for schedule documents (24 hours x 7 weekdays).
pub struct ScheduleBuilder {
    grid: Vec<Vec<u8>>,
}

impl ScheduleBuilder {
    /// Every cell set to `button`.
    pub fn uniform(button: u8) -> Self {
        Self {
            grid: vec![vec![button; 7]; 24],
        }
    }

    /// Set one cell; `weekday` 0 is Sunday.
    pub fn set(mut self, hour: usize, weekday: usize, button: u8) -> Self {
        self.grid[hour][weekday] = button;
        self
    }

    /// Set a whole hour row.
    pub fn hour(mut self, hour: usize, button: u8) -> Self {
        self.grid[hour] = vec![button; 7];
        self
    }

    pub fn build(self) -> ScheduleDocument {
        ScheduleDocument {
            button_state: self.grid,
        }
    }

    pub fn to_json(self) -> String {
        serde_json::to_string(&self.build()).expect("schedule document serializes")
    }

    /// Write the document to `path` and return it.
    pub fn write_to(self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref().to_path_buf();
        std::fs::write(&path, self.to_json()).expect("writing schedule document");
        path
    }
}
