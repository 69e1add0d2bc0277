use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logging configuration for host programs.
///
/// `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Directory for daily-rolling log files. Console only when `None`.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "aligner".to_string(),
            max_log_files: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("Failed to create log directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file appender: {0}")]
    Appender(String),
    #[error("Logging already initialized")]
    AlreadyInitialized,
}

pub fn setup_logging(config: &LogConfig) -> Result<(), LogSetupError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LogSetupError::InvalidFilter {
            filter: config.level.clone(),
            reason: e.to_string(),
        })?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer)
        .boxed();

    let file_layer = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LogSetupError::Directory {
                path: directory.clone(),
                source,
            })?;

            let file_appender = tracing_appender::rolling::Builder::new()
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .max_log_files(config.max_log_files)
                .build(directory)
                .map_err(|e| LogSetupError::Appender(e.to_string()))?;

            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            LOG_GUARD
                .set(guard)
                .map_err(|_| LogSetupError::AlreadyInitialized)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_console_only() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert_eq!(config.file_prefix, "aligner");
    }

    #[test]
    fn second_setup_fails_instead_of_panicking() {
        let config = LogConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        // The first call may race with other tests; the second must always fail.
        let _ = setup_logging(&config);
        assert!(matches!(
            setup_logging(&config),
            Err(LogSetupError::AlreadyInitialized)
        ));
    }
}
