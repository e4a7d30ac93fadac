//! Tracing setup.
//!
//! Logging is configured through [`LogConfig`], read from the environment
//! the same way as the engine and planner configs. Console output is always
//! on; daily-rolling file output is opt-in.

use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FILE_PREFIX: &str = "skillcoach.log";

/// Logging settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `skillcoach=debug`.
    pub level: String,
    /// Also write daily-rolling log files under `dir`.
    pub to_file: bool,
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: false,
            dir: PathBuf::from("./logs"),
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("SKILLCOACH_LOG") {
            if !level.is_empty() {
                config.level = level;
            }
        }
        config.to_file = std::env::var("SKILLCOACH_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if let Ok(dir) = std::env::var("SKILLCOACH_LOG_DIR") {
            config.dir = PathBuf::from(dir);
        }
        config
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Keeps the background file writer alive; drop it to flush buffered logs.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// keep the first subscriber. Hold the returned guard for the lifetime of
/// the process when file logging is enabled.
pub fn init_tracing(config: &LogConfig) -> Option<FileLogGuard> {
    let stdout_layer = fmt::layer().with_target(true);

    match config.to_file.then(|| file_writer(config)).flatten() {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            let _ = tracing_subscriber::registry()
                .with(config.filter())
                .with(stdout_layer)
                .with(file_layer)
                .try_init();
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(config.filter())
                .with(stdout_layer)
                .try_init();
            None
        }
    }
}

fn file_writer(config: &LogConfig) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(&config.dir) {
        eprintln!("failed to create log directory {}: {err}", config.dir.display());
        return None;
    }
    let appender = RollingFileAppender::new(Rotation::DAILY, &config.dir, FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}
