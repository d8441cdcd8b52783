//! Runner configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via TABFSM_CONFIG)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabfsm_core::{CompileOptions, TableFormat, TransitionTable};
use thiserror::Error;

/// Runner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transition table source.
    pub table: TableConfig,
    /// Compile options.
    pub compile: CompileOptions,
    /// Output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("TABFSM_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.table.apply_env_overrides();
        apply_compile_env_overrides(&mut self.compile);
        self.output.apply_env_overrides();
    }

    /// Checks that the configuration can be used to start a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.path.is_none() {
            return Err(ConfigError::Validation(
                "no transition table configured (set table.path or TABFSM_TABLE)".to_string(),
            ));
        }
        if self.compile.wildcard.is_empty() {
            return Err(ConfigError::Validation(
                "compile.wildcard must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Transition table source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Path to a JSON or YAML table.
    pub path: Option<PathBuf>,
    /// Initial state (defaults to the first declared state).
    pub initial: Option<String>,
}

impl TableConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TABFSM_TABLE") {
            self.path = Some(PathBuf::from(path));
        }
        if let Ok(initial) = std::env::var("TABFSM_INITIAL") {
            self.initial = Some(initial);
        }
    }

    /// Reads and validates the configured table.
    pub fn load(&self) -> Result<TransitionTable, ConfigError> {
        let path = self.path.as_ref().ok_or_else(|| {
            ConfigError::Validation("no transition table configured".to_string())
        })?;
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        TransitionTable::parse(&content, TableFormat::from_path(path))
            .map_err(|e| ConfigError::Table(path.clone(), e))
    }
}

fn apply_compile_env_overrides(options: &mut CompileOptions) {
    if let Ok(wildcard) = std::env::var("TABFSM_WILDCARD") {
        options.wildcard = wildcard;
    }
    if let Ok(caps) = std::env::var("TABFSM_CAPITALIZATION") {
        match caps.parse() {
            Ok(parsed) => options.capitalization = parsed,
            Err(e) => tracing::warn!("Ignoring TABFSM_CAPITALIZATION: {}", e),
        }
    }
    if let Ok(enabled) = std::env::var("TABFSM_TERMINAL_SIGNALS") {
        options.terminal_signals = parse_flag(&enabled);
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print the current state after every input.
    pub echo_state: bool,
}

impl OutputConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("TABFSM_ECHO_STATE") {
            self.echo_state = parse_flag(&enabled);
        }
    }
}

/// Env flags are set unless the value is empty or one of the usual falsey
/// spellings, matching the CLI's handling of the same variables.
fn parse_flag(value: &str) -> bool {
    const FALSEY: [&str; 6] = ["0", "n", "no", "f", "false", "off"];
    !value.is_empty() && !FALSEY.iter().any(|f| value.eq_ignore_ascii_case(f))
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{}': {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, String),

    #[error("invalid transition table '{}': {}", .0.display(), .1)]
    Table(PathBuf, tabfsm_core::CoreError),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
