//! Configuration loading and config file resolution
//!
//! Config file location priority:
//! 1. Command-line argument (highest priority)
//! 2. `ABM_CONFIG` environment variable
//! 3. `<user config dir>/abm/config.toml`
//! 4. Compiled defaults (no file)
//!
//! A missing file is not fatal: a warning is logged and defaults apply.
//! A file that exists but does not parse is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "ABM_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Seed data file; relative paths resolve against the config file's folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Admin console behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Prompt shown before each interactive command
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Print each command before its output (useful for scripts)
    #[serde(default)]
    pub echo_commands: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            echo_commands: false,
        }
    }
}

fn default_prompt() -> String {
    "abm> ".to_string()
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Config file path resolution following the priority order above
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_arg: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    /// Candidate config path, or None when only defaults apply
    ///
    /// Explicit paths (argument, environment) are returned even if the file
    /// does not exist so the caller can warn about them. The per-user path is
    /// only returned when present.
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_arg {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path().filter(|path| path.exists())
    }
}

/// Per-user config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("abm").join("config.toml"))
}

/// Load configuration using [`ConfigResolver`]
pub fn load_config(cli_arg: Option<PathBuf>) -> Result<(TomlConfig, ConfigSource)> {
    let Some(path) = ConfigResolver::new(cli_arg).resolve() else {
        info!("No config file found, using defaults");
        return Ok((TomlConfig::default(), ConfigSource::Defaults));
    };

    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok((TomlConfig::default(), ConfigSource::Defaults));
    }

    let mut config = load_toml_config(&path)?;
    if let (Some(seed), Some(dir)) = (&config.seed_file, path.parent()) {
        if seed.is_relative() {
            config.seed_file = Some(dir.join(seed));
        }
    }

    info!("Loaded config from {}", path.display());
    Ok((config, ConfigSource::File(path)))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TomlConfig) -> Result<()> {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        return Err(Error::Config(format!(
            "Invalid logging.level '{}' (expected one of {})",
            config.logging.level,
            LEVELS.join(", ")
        )));
    }
    Ok(())
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp = target.with_extension("toml.tmp");
    fs::write(&temp, content)?;
    fs::rename(&temp, target)?;
    Ok(())
}

/// Write a default config to `target` unless a file is already there
///
/// Returns false when an existing file was left untouched.
pub fn init_config(target: &Path) -> Result<bool> {
    if target.exists() {
        warn!("Config file already exists: {}", target.display());
        return Ok(false);
    }
    write_toml_config(&TomlConfig::default(), target)?;
    info!("Wrote default config to {}", target.display());
    Ok(true)
}
