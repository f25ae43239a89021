// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{AgentConfig, RawAgentConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawAgentConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawAgentConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawAgentConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Parses durations and checks the worker command and speed table.
/// - Resolves a relative schedule path against the config file's directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<AgentConfig> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let mut config = AgentConfig::try_from(raw_config)?;

    if config.schedule_path.is_relative() {
        config.schedule_path = config_root_dir(path).join(&config.schedule_path);
    }

    Ok(config)
}

/// Directory that relative paths in the config are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "etc/Pacekeeper.toml"),
///   that directory is used.
/// - For a bare filename like "Pacekeeper.toml" (parent = ""), the current
///   working directory is used.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Pacekeeper.toml")
}
