//! Structured logging infrastructure for relgraph.
//!
//! Installs a `tracing` subscriber built from [`LoggingConfig`]: an env filter
//! (`RUST_LOG` wins over the configured level), one fmt layer in the
//! configured format, and stdout and/or a non-blocking file as the sink.


use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::writer::{BoxMakeWriter, MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize the logging system with the given configuration.
///
/// Returns the file writer's guard when logging to a file; dropping it
/// flushes and stops the writer. If a global subscriber is already
/// installed, the existing one is kept and `Ok(None)` is returned.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config.level)?;

    let (writer, guard) = match (&config.file, config.stdout) {
        (Some(path), false) => {
            let (file, guard) = create_non_blocking_file(path)?;
            (BoxMakeWriter::new(file), Some(guard))
        }
        (Some(path), true) => {
            let (file, guard) = create_non_blocking_file(path)?;
            (BoxMakeWriter::new(std::io::stdout.and(file)), Some(guard))
        }
        (None, true) => (BoxMakeWriter::new(std::io::stdout), None),
        (None, false) => (BoxMakeWriter::new(std::io::sink), None),
    };

    let layer = fmt_layer(config.format, writer, config.file.is_none());

    match tracing_subscriber::registry().with(layer).with(filter).try_init() {
        Ok(()) => {
            tracing::debug!(level = %config.level, "Logging initialized");
            Ok(guard)
        }
        Err(_) => {
            tracing::debug!("Global subscriber already installed; keeping it");
            Ok(None)
        }
    }
}

fn build_filter(level: LogLevel) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_string()))
        .map_err(|e| LogError::InvalidFilter(e.to_string()))
}

fn fmt_layer(format: LogFormat, writer: BoxMakeWriter, ansi: bool) -> BoxedLayer {
    let base = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Default => base.boxed(),
    }
}

/// Create a non-blocking file writer, creating parent directories as needed.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::IoError(std::io::Error::other(format!(
            "log path has no file name: {}",
            path.display()
        ))))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}
