//! Console and file logging.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::export::generate_filename;
use crate::runtime::Runtime;

/// Verbosity accepted by `--log-level`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Path of the log file for a run started at `at`.
pub fn log_file_path(output_dir: &Path, base_name: &str, at: NaiveDateTime) -> PathBuf {
    output_dir.join(generate_filename(base_name, "log", at))
}

/// Installs a stderr layer and a plain-text file layer in `output_dir`.
///
/// `level` is the default directive; `RUST_LOG` can refine it. Returns the
/// log file path.
pub fn init<R: Runtime>(
    runtime: &R,
    level: LogLevel,
    output_dir: &Path,
    base_name: &str,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    if !runtime.exists(output_dir) {
        runtime.create_dir_all(output_dir)?;
    }

    let path = log_file_path(output_dir, base_name, at);
    let file = runtime.create_file(&path)?;

    let filter = || {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from(level).into())
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter()),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter()),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(path)
}
