//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across all plcbox applications.
//!
//! # Usage
//!
//! ```rust,no_run
//! use plcbox_common::config::{ConfigLoader, PlcboxConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = PlcboxConfig::load(Path::new("plcbox.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_CYCLE_TIME_MS, DEFAULT_DRIVER, MAX_BOARDS, MAX_CYCLE_TIME_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across all plcbox applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "plcbox-line-1"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: "plcbox".to_string(),
        }
    }
}

fn default_cycle_time_ms() -> u64 {
    DEFAULT_CYCLE_TIME_MS
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_rules_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_snapshot_every() -> u32 {
    1
}

/// `[engine]` section: control loop and board selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Control loop period in milliseconds.
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u64,

    /// Board address (0..=3).
    #[serde(default)]
    pub board_id: u8,

    /// Name of the board driver to load.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Directory holding `rules_board_{id}.json` files.
    #[serde(default = "default_rules_dir")]
    pub rules_dir: PathBuf,

    /// Publish a status snapshot every N cycles.
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            cycle_time_ms: default_cycle_time_ms(),
            board_id: 0,
            driver: default_driver(),
            rules_dir: default_rules_dir(),
            snapshot_every: default_snapshot_every(),
        }
    }
}

impl EngineSection {
    /// Control loop period as a `Duration`.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_millis(self.cycle_time_ms)
    }
}

/// Top-level `plcbox.toml` configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlcboxConfig {
    /// Shared service settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Engine settings.
    #[serde(default)]
    pub engine: EngineSection,
}

impl PlcboxConfig {
    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared.service_name` not empty
    /// 2. `1 <= engine.cycle_time_ms <= MAX_CYCLE_TIME_MS`
    /// 3. `engine.board_id < MAX_BOARDS`
    /// 4. `engine.driver` not empty
    /// 5. `engine.snapshot_every > 0`
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.engine.cycle_time_ms == 0 || self.engine.cycle_time_ms > MAX_CYCLE_TIME_MS {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_ms must be in 1..={MAX_CYCLE_TIME_MS}, got {}",
                self.engine.cycle_time_ms
            )));
        }

        if self.engine.board_id >= MAX_BOARDS {
            return Err(ConfigError::ValidationError(format!(
                "board_id must be below {MAX_BOARDS}, got {}",
                self.engine.board_id
            )));
        }

        if self.engine.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "driver cannot be empty".to_string(),
            ));
        }

        if self.engine.snapshot_every == 0 {
            return Err(ConfigError::ValidationError(
                "snapshot_every must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the rules file for the configured board.
    pub fn rules_path(&self) -> PathBuf {
        self.engine
            .rules_dir
            .join(crate::consts::rules_file_name(self.engine.board_id))
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
