//! Structured logging setup
//!
//! Diagnostics go through `tracing` and are written to stderr so that
//! stdout stays reserved for results. The level is derived from the
//! `--verbose`/`--debug` flags unless `RUST_LOG` says otherwise; debug mode
//! switches to JSON lines for easier post-processing.

use crate::error::{AppError, Result};
use crate::models::Config;
use tracing_subscriber::EnvFilter;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    fn directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line format
    Compact,
    /// JSON lines
    Json,
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub level: LogLevel,
    pub format: LogFormat,
    pub use_color: bool,
}

impl LogOptions {
    pub fn from_config(config: &Config) -> Self {
        let (level, format) = if config.debug {
            (LogLevel::Debug, LogFormat::Json)
        } else if config.verbose {
            (LogLevel::Info, LogFormat::Compact)
        } else {
            (LogLevel::Warn, LogFormat::Compact)
        };

        Self {
            level,
            format,
            use_color: config.enable_color,
        }
    }

    /// Filter for this crate only; dependencies stay at warn
    pub fn filter_directive(&self) -> String {
        format!("warn,{}={}", crate::PKG_NAME, self.level.directive())
    }
}

/// Install the global subscriber.
///
/// Calling this twice is harmless; the second call reports an internal
/// error which callers are free to ignore.
pub fn init_logging(options: &LogOptions) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.filter_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match options.format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Compact => builder.compact().with_ansi(options.use_color).try_init(),
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install logger: {}", e)))
}
