// src/schedule/mod.rs

//! Schedule evaluation.
//!
//! - [`document`] is the JSON (hour x weekday) button grid.
//! - [`table`] maps button codes to [`SpeedValue`](crate::types::SpeedValue)s.
//! - [`source`] defines the [`SpeedSource`] seam and the file-backed schedule.
//! - [`poller`] periodically feeds readings into the runtime event channel.

pub mod document;
pub mod poller;
pub mod source;
pub mod table;

pub use document::ScheduleDocument;
pub use poller::spawn_schedule_poller;
pub use source::{resolve_speed, FileSchedule, SpeedSource};
pub use table::SpeedTable;
