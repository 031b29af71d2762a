//! File logging for the CLI.
//!
//! Records go to `dcolgen.log` next to `config.yaml`. Errors are also printed
//! to stderr by `main`, so the log is for after-the-fact diagnosis.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Once;

use log::{LevelFilter, debug, info};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::app_config_dir;

static INIT: Once = Once::new();

/// Start logging to the default file.
///
/// Debug builds record everything; release builds record INFO and up, or
/// DEBUG and up with `verbose`. Only the first call has any effect: it
/// returns `Ok(true)`, later calls return `Ok(false)`.
pub fn init_logging(verbose: bool) -> Result<bool, InitLogError> {
    init_logging_at(&log_file_path(), level_for(verbose))
}

/// [`init_logging`] with an explicit file and level.
pub fn init_logging_at(log_path: &Path, level: LevelFilter) -> Result<bool, InitLogError> {
    let mut outcome = Ok(false);
    INIT.call_once(|| outcome = install(log_path, level).map(|()| true));
    outcome
}

fn level_for(verbose: bool) -> LevelFilter {
    match (cfg!(debug_assertions), verbose) {
        (true, _) => LevelFilter::Trace,
        (false, true) => LevelFilter::Debug,
        (false, false) => LevelFilter::Info,
    }
}

fn install(log_path: &Path, level: LevelFilter) -> Result<(), InitLogError> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(InitLogError::Io)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(InitLogError::Io)?;

    let mut builder = ConfigBuilder::new();
    // timestamps only on ERROR records
    builder.set_time_level(LevelFilter::Error);
    // stays on UTC when the local offset cannot be determined
    let local_offset = builder.set_time_offset_to_local().is_ok();

    WriteLogger::init(level, builder.build(), file)
        .map_err(|e| InitLogError::SetLogger(e.to_string()))?;

    info!("Logging to {}", log_path.display());
    debug!("Local time offset available: {local_offset}");
    Ok(())
}

fn log_file_path() -> PathBuf {
    app_config_dir().join("dcolgen.log")
}

#[derive(Debug)]
pub enum InitLogError {
    Io(std::io::Error),
    SetLogger(String),
}

impl fmt::Display for InitLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Cannot open log file: {e}"),
            Self::SetLogger(e) => write!(f, "Logger already installed: {e}"),
        }
    }
}

impl std::error::Error for InitLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::SetLogger(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use log::{error, trace};

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("dcolgen.log");

        assert!(init_logging_at(&path, LevelFilter::Trace).unwrap());
        assert!(!init_logging_at(&path, LevelFilter::Trace).unwrap());
        trace!("trace after init");
        error!("error after init");
        assert!(path.exists());
    }

    #[test]
    fn log_file_sits_next_to_config() {
        let path = log_file_path();
        assert_eq!(path.file_name().unwrap(), "dcolgen.log");
        assert_eq!(path.parent(), Config::file_path().parent());
    }
}
