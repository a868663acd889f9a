//! Logging for Clipfetch runs
//!
//! Two sinks are installed. The console (stderr) shows what the user asked
//! for with `--log-level`; the run log under `logs/` records every attempt
//! at trace level so an exhausted resolution can be diagnosed afterwards.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::ClipfetchError;

/// Name of the run log, overwritten on every invocation.
pub const LOG_FILE_NAME: &str = "clipfetch-last-run.log";

const DEFAULT_LOGS_DIR: &str = "logs";

/// Where the run log lands for a given `--logs-dir` value.
pub fn run_log_path(logs_dir: Option<&Path>) -> PathBuf {
    logs_dir
        .unwrap_or_else(|| Path::new(DEFAULT_LOGS_DIR))
        .join(LOG_FILE_NAME)
}

/// Installs the global subscriber: stderr at `console_level`, run log at trace.
///
/// `RUST_LOG`, when set, replaces `console_level` for the console sink only.
///
/// # Errors
///
/// - `ClipfetchError::Io` - Logs directory or run log could not be created
/// - `ClipfetchError::Configuration` - A global subscriber is already installed
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> crate::Result<()> {
    let log_path = run_log_path(logs_dir);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let run_log = File::create(&log_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.as_str()));

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file = fmt::layer()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(run_log)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| ClipfetchError::Configuration {
            reason: format!("tracing already initialised: {e}"),
        })?;

    tracing::debug!("Run log at {}", log_path.display());
    Ok(())
}

/// Verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use clipfetch_core::tracing_setup::CliLogLevel;
    ///
    /// assert_eq!(CliLogLevel::Info.as_tracing_level(), tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| format!("Invalid log level: {s}"))
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_round_trips_through_strings() {
        for level in CliLogLevel::value_variants() {
            let parsed: CliLogLevel = level.to_string().parse().unwrap();
            assert_eq!(parsed, *level);
        }
    }

    #[test]
    fn test_log_level_parsing_is_case_insensitive() {
        assert_eq!("warn".parse::<CliLogLevel>().unwrap(), CliLogLevel::Warn);
        assert_eq!("Debug".parse::<CliLogLevel>().unwrap(), CliLogLevel::Debug);
        assert!("verbose".parse::<CliLogLevel>().is_err());
    }

    #[test]
    fn test_run_log_path_defaults_to_logs_dir() {
        assert_eq!(
            run_log_path(None),
            Path::new("logs").join("clipfetch-last-run.log")
        );
        assert_eq!(
            run_log_path(Some(Path::new("/tmp/cf"))),
            Path::new("/tmp/cf/clipfetch-last-run.log")
        );
    }

    #[test]
    fn test_init_tracing_creates_run_log() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("nested");

        // The file exists even if another test already installed a subscriber
        let _ = init_tracing(Level::WARN, Some(&logs));

        assert!(logs.join(LOG_FILE_NAME).exists());
    }
}
