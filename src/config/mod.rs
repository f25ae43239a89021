// src/config/mod.rs

//! Configuration loading and validation for pacekeeper.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate and convert the raw model into an [`AgentConfig`] (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{config_root_dir, default_config_path, load_and_validate, load_from_path};
pub use model::{
    AgentConfig, AgentSection, RawAgentConfig, ScheduleSection, WorkerSection, WorkerSpec,
};
pub use validate::default_lock_file;
