// tests/config_loading.rs

mod common;
use crate::common::builders::AgentConfigBuilder;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tempfile::{tempdir, NamedTempFile};

use pacekeeper::cli::CliArgs;
use pacekeeper::config::{
    default_config_path, default_lock_file, load_and_validate, parse_duration, AgentConfig,
};
use pacekeeper::errors::PacekeeperError;
use pacekeeper::types::SpeedValue;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded_and_schedule_path_resolved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Pacekeeper.toml");
    std::fs::write(
        &path,
        r#"
[agent]
lock_file = "/tmp/pacekeeper-test.pid"
poll_interval = "250ms"

[schedule]
path = "conf/scheduler.conf"
speeds = [-1, 20, 0, "stop", 55]

[worker]
cmd = "/usr/bin/python test.py {speed}"
kill_timeout = "10s"
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.lock_file, PathBuf::from("/tmp/pacekeeper-test.pid"));
    assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.schedule_path, dir.path().join("conf/scheduler.conf"));
    assert_eq!(
        cfg.speeds.iter().copied().collect::<Vec<_>>(),
        vec![
            SpeedValue::Stop,
            SpeedValue::Active(20),
            SpeedValue::Active(0),
            SpeedValue::Stop,
            SpeedValue::Active(55),
        ]
    );
    assert_eq!(cfg.worker.kill_timeout, Some(Duration::from_secs(10)));
    assert_eq!(cfg.worker.command_line(20), "/usr/bin/python test.py 20");
}

#[test]
fn defaults_apply_when_only_worker_is_given() {
    let file = write_config(
        r#"
[worker]
cmd = "run-backup"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.poll_interval, Duration::from_secs(5));
    assert_eq!(cfg.lock_file, default_lock_file());
    assert!(cfg.lock_file.ends_with("pacekeeper.pid"));
    assert!(cfg.schedule_path.ends_with("scheduler.conf"));
    assert!(cfg.schedule_path.is_absolute());
    assert_eq!(cfg.speeds.resolve(0), Some(SpeedValue::Stop));
    assert_eq!(cfg.speeds.resolve(1), Some(SpeedValue::Active(20)));
    assert_eq!(cfg.speeds.resolve(2), Some(SpeedValue::Active(0)));
    assert_eq!(cfg.speeds.resolve(3), None);
    assert_eq!(cfg.worker.kill_timeout, None);
    assert_eq!(cfg.worker.command_line(0), "run-backup 0");
}

#[test]
fn absolute_schedule_path_is_kept() {
    let file = write_config(
        r#"
[schedule]
path = "/etc/pacekeeper/scheduler.conf"

[worker]
cmd = "run-backup"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.schedule_path, PathBuf::from("/etc/pacekeeper/scheduler.conf"));
}

#[test]
fn empty_worker_command_returns_config_error() {
    let file = write_config(
        r#"
[worker]
cmd = "   "
"#,
    );

    match load_and_validate(file.path()) {
        Err(PacekeeperError::ConfigError(msg)) => assert!(msg.contains("[worker].cmd")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn bad_poll_interval_returns_config_error() {
    for interval in ["5x", "0s", "fast"] {
        let file = write_config(&format!(
            r#"
[agent]
poll_interval = "{interval}"

[worker]
cmd = "run-backup"
"#
        ));

        match load_and_validate(file.path()) {
            Err(PacekeeperError::ConfigError(msg)) => {
                assert!(msg.contains("poll_interval"), "{interval}: {msg}")
            }
            other => panic!("{interval}: expected ConfigError, got {other:?}"),
        }
    }
}

#[test]
fn bad_kill_timeout_returns_config_error() {
    let file = write_config(
        r#"
[worker]
cmd = "run-backup"
kill_timeout = "soon"
"#,
    );

    match load_and_validate(file.path()) {
        Err(PacekeeperError::ConfigError(msg)) => assert!(msg.contains("kill_timeout")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_speed_table_returns_config_error() {
    let file = write_config(
        r#"
[schedule]
speeds = []

[worker]
cmd = "run-backup"
"#,
    );

    match load_and_validate(file.path()) {
        Err(PacekeeperError::ConfigError(msg)) => assert!(msg.contains("speeds")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_speed_entry_returns_toml_error() {
    let file = write_config(
        r#"
[schedule]
speeds = ["stop", "fast"]

[worker]
cmd = "run-backup"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(PacekeeperError::TomlError(_))
    ));
}

#[test]
fn missing_worker_section_returns_toml_error() {
    let file = write_config(
        r#"
[agent]
poll_interval = "5s"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(PacekeeperError::TomlError(_))
    ));
}

#[test]
fn missing_config_file_returns_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("nope.toml")),
        Err(PacekeeperError::IoError(_))
    ));
}

#[test]
fn builder_config_round_trips_through_validation() {
    let cfg: AgentConfig = AgentConfigBuilder::new("worker --speed={speed} --quiet")
        .poll_interval("1m")
        .kill_timeout("2s")
        .speeds(vec![SpeedValue::Active(5)])
        .build();

    assert_eq!(cfg.poll_interval, Duration::from_secs(60));
    assert_eq!(cfg.worker.kill_timeout, Some(Duration::from_secs(2)));
    assert_eq!(cfg.worker.command_line(5), "worker --speed=5 --quiet");
}

#[test]
fn parse_duration_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 5s "), Ok(Duration::from_secs(5)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("3d").is_err());
}

#[test]
fn parse_duration_rejects_values_that_overflow() {
    let max = u64::MAX;
    assert_eq!(parse_duration(&format!("{max}s")), Ok(Duration::from_secs(max)));

    let err = parse_duration(&format!("{max}h")).unwrap_err();
    assert!(err.contains("too large"), "{err}");
    assert!(parse_duration(&format!("{}m", max / 60 + 1)).is_err());
}

#[test]
fn cli_defaults_to_config_in_working_directory() {
    let args = CliArgs::try_parse_from(["pacekeeper"]).unwrap();
    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, PathBuf::from("Pacekeeper.toml"));
    assert!(!args.dry_run);
    assert!(args.lock_file.is_none());

    let args = CliArgs::try_parse_from([
        "pacekeeper",
        "--config",
        "/etc/pacekeeper/agent.toml",
        "--lock-file",
        "/tmp/pk.pid",
        "--dry-run",
    ])
    .unwrap();
    assert_eq!(args.config, PathBuf::from("/etc/pacekeeper/agent.toml"));
    assert_eq!(args.lock_file.as_deref(), Some("/tmp/pk.pid"));
    assert!(args.dry_run);
}

#[test]
fn speed_value_parsing_and_display() {
    assert_eq!("stop".parse::<SpeedValue>(), Ok(SpeedValue::Stop));
    assert_eq!("STOP".parse::<SpeedValue>(), Ok(SpeedValue::Stop));
    assert_eq!("-1".parse::<SpeedValue>(), Ok(SpeedValue::Stop));
    assert_eq!("0".parse::<SpeedValue>(), Ok(SpeedValue::Active(0)));
    assert_eq!("20".parse::<SpeedValue>(), Ok(SpeedValue::Active(20)));
    assert!("fast".parse::<SpeedValue>().is_err());

    assert_eq!(SpeedValue::Stop.to_string(), "stop");
    assert_eq!(SpeedValue::Active(0).to_string(), "0");
    assert_eq!(SpeedValue::Active(0).argument(), Some(0));
    assert_eq!(SpeedValue::Stop.argument(), None);
}
