// src/schedule/document.rs

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// The schedule document as written by the scheduling UI.
///
/// ```json
/// { "button_state": [[0, 1, 1, 1, 1, 1, 0], ...] }
/// ```
///
/// `button_state` has one row per hour of the day (0..24) and one column per
/// weekday, Sunday first. Each cell is a button code looked up in the
/// [`SpeedTable`](super::SpeedTable).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScheduleDocument {
    pub button_state: Vec<Vec<u8>>,
}

impl ScheduleDocument {
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Button code for a given hour (0-23) and weekday (0 = Sunday).
    pub fn button_at(&self, hour: u32, weekday: u32) -> Option<u8> {
        self.button_state
            .get(hour as usize)
            .and_then(|row| row.get(weekday as usize))
            .copied()
    }
}
