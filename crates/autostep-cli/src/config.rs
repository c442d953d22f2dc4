//! CLI configuration parsed from environment variables.
//!
//! Settings can be supplied via environment variables prefixed with
//! `AUTOSTEP_` and overridden by command line flags.

use std::env;
use std::str::FromStr;

use autostep_linker::LinkerOptions;

use crate::error::CliError;

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Info` when not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging, includes all trace spans.
    Trace,
    /// Debug-level information, including per-file link summaries.
    Debug,
    /// Standard informational messages.
    #[default]
    Info,
    /// Warning messages, such as rejected step definitions.
    Warn,
    /// Error messages for failures.
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(CliError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, CliError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CliError::InvalidConfig(format!(
            "invalid value '{value}' for {name}, expected true or false"
        ))),
    }
}

/// Configuration for `autostep-link`.
///
/// # Environment Variables
///
/// - `AUTOSTEP_LOG_LEVEL`: Sets the log level (trace, debug, info, warn,
///   error)
/// - `AUTOSTEP_WHITESPACE_WARNINGS`: Whether to warn about whitespace inside
///   quoted arguments (true/false)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: LogLevel,
    /// Warn about whitespace inside quoted arguments.
    pub whitespace_warnings: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            whitespace_warnings: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` if an environment variable contains
    /// an invalid value.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Missing values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` for invalid values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let log_level = match lookup("AUTOSTEP_LOG_LEVEL") {
            Some(val) => val.parse()?,
            None => defaults.log_level,
        };
        let whitespace_warnings = match lookup("AUTOSTEP_WHITESPACE_WARNINGS") {
            Some(val) => parse_flag("AUTOSTEP_WHITESPACE_WARNINGS", &val)?,
            None => defaults.whitespace_warnings,
        };
        Ok(Self {
            log_level,
            whitespace_warnings,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// This is intended for CLI overrides that should take precedence over
    /// environment-based defaults.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        whitespace_warnings: Option<bool>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if let Some(enabled) = whitespace_warnings {
            self.whitespace_warnings = enabled;
        }
        self
    }

    /// Linker options implied by this configuration.
    #[must_use]
    pub fn linker_options(&self) -> LinkerOptions {
        LinkerOptions {
            whitespace_warnings: self.whitespace_warnings,
        }
    }
}
