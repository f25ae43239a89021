// tests/schedule_resolution.rs

mod common;
use crate::common::builders::ScheduleBuilder;
use crate::common::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::mpsc;

use pacekeeper::engine::RuntimeEvent;
use pacekeeper::errors::{PacekeeperError, Result};
use pacekeeper::fs::mock::MockFileSystem;
use pacekeeper::schedule::{
    resolve_speed, spawn_schedule_poller, FileSchedule, ScheduleDocument, SpeedSource, SpeedTable,
};
use pacekeeper::types::SpeedValue::{self, Active, Stop};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 30, 0)
        .unwrap()
}

fn default_table() -> SpeedTable {
    SpeedTable::new(vec![Stop, Active(20), Active(0)])
}

#[test]
fn weekday_columns_start_on_sunday() {
    // Sunday 0, Monday 1, Saturday 6.
    let doc = ScheduleBuilder::uniform(0)
        .set(9, 0, 1)
        .set(9, 1, 2)
        .set(9, 6, 1)
        .build();
    let table = default_table();

    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 7, 9)).unwrap(), Active(20));
    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 8, 9)).unwrap(), Active(0));
    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 13, 9)).unwrap(), Active(20));

    // Tuesday, same hour: untouched cell.
    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 9, 9)).unwrap(), Stop);
    // Sunday, other hour.
    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 7, 10)).unwrap(), Stop);
}

#[test]
fn hour_rows_cover_the_whole_day() {
    let doc = ScheduleBuilder::uniform(0).hour(0, 2).hour(23, 1).build();
    let table = default_table();

    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 10, 0)).unwrap(), Active(0));
    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 10, 23)).unwrap(), Active(20));
    assert_eq!(resolve_speed(&doc, &table, at(2024, 1, 10, 12)).unwrap(), Stop);
}

#[test]
fn button_outside_speed_table_is_a_schedule_error() {
    let doc = ScheduleBuilder::uniform(7).build();

    match resolve_speed(&doc, &default_table(), at(2024, 1, 10, 4)) {
        Err(PacekeeperError::ScheduleError(msg)) => {
            assert!(msg.contains("button code 7"), "{msg}");
            assert!(msg.contains("size 3"), "{msg}");
        }
        other => panic!("expected ScheduleError, got {other:?}"),
    }
}

#[test]
fn short_grid_is_a_schedule_error() {
    let doc = ScheduleDocument {
        button_state: vec![vec![1; 7]; 3],
    };

    assert_eq!(resolve_speed(&doc, &default_table(), at(2024, 1, 10, 2)).unwrap(), Active(20));
    match resolve_speed(&doc, &default_table(), at(2024, 1, 10, 5)) {
        Err(PacekeeperError::ScheduleError(msg)) => assert!(msg.contains("hour 5"), "{msg}"),
        other => panic!("expected ScheduleError, got {other:?}"),
    }
}

#[test]
fn document_parses_from_json() {
    let json = ScheduleBuilder::uniform(1).set(3, 4, 2).to_json();
    let doc = ScheduleDocument::from_json(&json).unwrap();

    assert_eq!(doc.button_state.len(), 24);
    assert_eq!(doc.button_at(3, 4), Some(2));
    assert_eq!(doc.button_at(3, 5), Some(1));
    assert_eq!(doc.button_at(24, 0), None);
    assert_eq!(doc.button_at(0, 7), None);
}

#[test]
fn file_schedule_reads_through_the_filesystem_and_sees_edits() {
    let fs = MockFileSystem::new();
    let path = PathBuf::from("/etc/pacekeeper/scheduler.conf");
    fs.add_file(&path, ScheduleBuilder::uniform(1).to_json());

    let schedule = FileSchedule::new(Arc::new(fs.clone()), &path, default_table());
    assert_eq!(schedule.path(), path.as_path());
    assert_eq!(schedule.speed_at(at(2024, 1, 10, 12)).unwrap(), Active(20));

    // Edited on disk: picked up on the next evaluation.
    fs.add_file(&path, ScheduleBuilder::uniform(0).to_json());
    assert_eq!(schedule.speed_at(at(2024, 1, 10, 12)).unwrap(), Stop);

    // Deleted later on: the next evaluation fails.
    fs.remove(&path);
    assert!(matches!(
        schedule.speed_at(at(2024, 1, 10, 12)),
        Err(PacekeeperError::ScheduleError(_))
    ));
}

#[test]
fn missing_schedule_file_is_a_schedule_error() {
    let fs = MockFileSystem::new();
    let schedule = FileSchedule::new(Arc::new(fs), "/nowhere/scheduler.conf", default_table());

    match schedule.speed_at(at(2024, 1, 10, 12)) {
        Err(PacekeeperError::ScheduleError(msg)) => {
            assert!(msg.contains("/nowhere/scheduler.conf"), "{msg}")
        }
        other => panic!("expected ScheduleError, got {other:?}"),
    }
}

#[test]
fn malformed_schedule_file_is_a_parse_error() {
    let fs = MockFileSystem::new();
    fs.add_file("scheduler.conf", "{\"button_state\": [[1, 2");

    let schedule = FileSchedule::new(Arc::new(fs), "scheduler.conf", default_table());
    assert!(matches!(
        schedule.speed_at(at(2024, 1, 10, 12)),
        Err(PacekeeperError::JsonError(_))
    ));
}

/// Returns a fixed speed and counts how often it was asked.
struct FixedSource {
    speed: SpeedValue,
    calls: AtomicUsize,
}

impl SpeedSource for FixedSource {
    fn speed_at(&self, _at: NaiveDateTime) -> Result<SpeedValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.speed)
    }
}

struct BrokenSource;

impl SpeedSource for BrokenSource {
    fn speed_at(&self, _at: NaiveDateTime) -> Result<SpeedValue> {
        Err(PacekeeperError::ScheduleError("scheduler.conf vanished".to_string()))
    }
}

#[tokio::test]
async fn poller_sends_a_reading_on_every_tick() {
    init_tracing();

    let source = Arc::new(FixedSource {
        speed: Active(20),
        calls: AtomicUsize::new(0),
    });
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(8);
    let handle = spawn_schedule_poller(source.clone(), Duration::from_millis(20), tx);

    // Same value every time; the poller does not deduplicate.
    for _ in 0..3 {
        assert_eq!(
            with_timeout(rx.recv()).await,
            Some(RuntimeEvent::SpeedReading(Active(20)))
        );
    }
    assert!(source.calls.load(Ordering::SeqCst) >= 3);

    // Closing the channel ends the task.
    drop(rx);
    with_timeout(handle).await.unwrap();
}

#[tokio::test]
async fn poller_reports_schedule_failure_and_stops() {
    init_tracing();

    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(8);
    let handle = spawn_schedule_poller(Arc::new(BrokenSource), Duration::from_millis(10), tx);

    match with_timeout(rx.recv()).await {
        Some(RuntimeEvent::ScheduleFailed { reason }) => {
            assert!(reason.contains("scheduler.conf vanished"), "{reason}")
        }
        other => panic!("expected ScheduleFailed, got {other:?}"),
    }

    with_timeout(handle).await.unwrap();
    // The sender went away with the task.
    assert_eq!(with_timeout(rx.recv()).await, None);
}
