//! Configuration for the tabterm binary.
//!
//! TOML-based configuration file loading and saving. The default path is
//! `~/.config/tabterm/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transport::TermSize;

use crate::channel::{SessionOptions, DEFAULT_HOST, DEFAULT_TERM_TYPE};

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("terminal size must be at least 1x1, got {cols}x{rows}")]
    InvalidTermSize { cols: u16, rows: u16 },

    #[error("log level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),

    #[error("shell path does not exist: {0}")]
    InvalidShellPath(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for tabterm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Where new sessions connect.
    pub connection: ConnectionConfig,

    /// Terminal defaults for new sessions.
    pub terminal: TerminalConfig,

    /// Logging configuration.
    pub log: LogConfig,
}

/// Connection defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Host new sessions connect to.
    pub host: String,

    /// Terminal type reported to the remote side.
    pub term_type: String,
}

/// Terminal defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerminalConfig {
    /// Initial width in columns.
    pub cols: u16,

    /// Initial height in rows.
    pub rows: u16,

    /// Program to run instead of the login shell.
    pub shell: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            term_type: DEFAULT_TERM_TYPE.to_string(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            shell: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path, if the platform has a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabterm").join("config.toml"))
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Loads configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize configuration")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.terminal.cols == 0 || self.terminal.rows == 0 {
            return Err(ConfigError::InvalidTermSize {
                cols: self.terminal.cols,
                rows: self.terminal.rows,
            });
        }
        if !VALID_LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log.level.clone()));
        }
        if let Some(shell) = &self.terminal.shell {
            if !Path::new(shell).exists() {
                return Err(ConfigError::InvalidShellPath(shell.clone()));
            }
        }
        Ok(())
    }

    /// Builds session options from the configured defaults.
    ///
    /// `host` overrides the configured host when given.
    pub fn session_options(&self, host: Option<&str>) -> SessionOptions {
        SessionOptions {
            host: host.unwrap_or(&self.connection.host).to_string(),
            program: self.terminal.shell.clone(),
            term_type: self.connection.term_type.clone(),
            size: TermSize::new(self.terminal.cols, self.terminal.rows),
        }
    }
}
