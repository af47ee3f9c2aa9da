//! Terminal and file logging for programs that drive a controller.
//!
//! The library only emits `tracing` events. A control program installs a
//! subscriber once with `init_logging` and keeps the returned guards alive
//! until it exits.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::PidConfig;

/// Background writers for the terminal and the log file.
/// Buffered lines are flushed when this is dropped.
pub struct LoggingGuards {
    _stdout: WorkerGuard,
    _file: WorkerGuard,
}

/// Current UTC time to the second, usable as a file name on any platform
pub fn default_op_name() -> String {
    DateTime::<Utc>::from(SystemTime::now())
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        .replace(":", "")
}

/// Log file for an operation
pub fn log_path(op_dir: &Path, op_name: &str) -> PathBuf {
    op_dir.join("logs").join(format!("{op_name}.log"))
}

/// Send controller events to the terminal and to `log_path(op_dir, op_name)`.
///
/// `RUST_LOG` takes precedence over `default_level`. Use `"debug"` to see
/// flush transitions and `"trace"` to see ticks skipped by the sample time.
/// Only one subscriber can be installed per process; later calls fail.
pub fn init_logging(
    op_dir: &Path,
    op_name: &str,
    default_level: &str,
) -> Result<(PathBuf, LoggingGuards), String> {
    let path = log_path(op_dir, op_name);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("Failed to create log directory: {e}"))?;
    }
    let logfile = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file {path:?}: {e}"))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| format!("Invalid log level `{default_level}`: {e}"))?;

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let (file_writer, file_guard) = tracing_appender::non_blocking(logfile);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_writer(stdout_writer)
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {e}"))?;

    let guards = LoggingGuards {
        _stdout: stdout_guard,
        _file: file_guard,
    };

    Ok((path, guards))
}

/// Record the tuning a controller was built with
pub fn log_tuning(op_name: &str, cfg: &PidConfig) {
    info!(
        op_name,
        kp = cfg.kp,
        ki = cfg.ki,
        kd = cfg.kd,
        sample_time = cfg.sample_time,
        windup_guard = cfg.windup_guard,
        "Controller tuning"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_op_name_is_a_valid_file_name() {
        let name = default_op_name();
        assert!(!name.contains(':'), "{name}");
        assert!(name.ends_with('Z'), "{name}");
    }

    #[test]
    fn log_file_lives_under_logs_dir() {
        let path = log_path(Path::new("/tmp/run"), "flush_test");
        assert_eq!(path, PathBuf::from("/tmp/run/logs/flush_test.log"));
    }
}
