// src/schedule/table.rs

use crate::types::SpeedValue;

/// Maps schedule button codes to speeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedTable {
    speeds: Vec<SpeedValue>,
}

impl SpeedTable {
    pub fn new(speeds: Vec<SpeedValue>) -> Self {
        Self { speeds }
    }

    pub fn resolve(&self, button: u8) -> Option<SpeedValue> {
        self.speeds.get(button as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeedValue> {
        self.speeds.iter()
    }
}
