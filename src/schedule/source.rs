// src/schedule/source.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::trace;

use crate::errors::{PacekeeperError, Result};
use crate::fs::FileSystem;
use crate::types::SpeedValue;

use super::{ScheduleDocument, SpeedTable};

/// Anything that can answer "what speed should the worker run at, right now?".
///
/// The supervisor never sees button codes or documents; only the resolved
/// [`SpeedValue`] produced here. Tests can plug in their own source.
pub trait SpeedSource: Send + Sync {
    /// Resolve the desired speed for a local wall-clock time.
    fn speed_at(&self, at: NaiveDateTime) -> Result<SpeedValue>;
}

/// Resolve `at` against a parsed document and speed table.
pub fn resolve_speed(
    document: &ScheduleDocument,
    table: &SpeedTable,
    at: NaiveDateTime,
) -> Result<SpeedValue> {
    let hour = at.hour();
    let weekday = at.weekday().num_days_from_sunday();

    let button = document.button_at(hour, weekday).ok_or_else(|| {
        PacekeeperError::ScheduleError(format!(
            "schedule has no entry for hour {hour}, weekday {weekday}"
        ))
    })?;

    table.resolve(button).ok_or_else(|| {
        PacekeeperError::ScheduleError(format!(
            "button code {button} at hour {hour}, weekday {weekday} is outside the speed table (size {})",
            table.len()
        ))
    })
}

/// Schedule backed by a JSON document on disk.
///
/// The document is re-read on every call so edits are picked up without
/// restarting the agent.
#[derive(Debug, Clone)]
pub struct FileSchedule {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    table: SpeedTable,
}

impl FileSchedule {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>, table: SpeedTable) -> Self {
        Self {
            fs,
            path: path.into(),
            table,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document.
    pub fn load_document(&self) -> Result<ScheduleDocument> {
        let contents = self.fs.read_to_string(&self.path).map_err(|e| {
            PacekeeperError::ScheduleError(format!("reading {:?}: {e:#}", self.path))
        })?;
        ScheduleDocument::from_json(&contents)
    }
}

impl SpeedSource for FileSchedule {
    fn speed_at(&self, at: NaiveDateTime) -> Result<SpeedValue> {
        let document = self.load_document()?;
        let speed = resolve_speed(&document, &self.table, at)?;
        trace!(path = ?self.path, %at, %speed, "resolved schedule");
        Ok(speed)
    }
}
