//! Structured logging configuration for the decoding pipeline.
//!
//! Core modules emit events through the `tracing` macros only — decoder
//! iteration traces are `trace!`-level and free when no subscriber is
//! installed. Binaries and benchmark drivers install a subscriber once at
//! startup via [`init_logging`], optionally from a YAML-serialized
//! [`LogConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use qkr_core::observe::{init_logging, LogConfig, LogLevel};
//!
//! let mut config = LogConfig::default();
//! config.level = LogLevel::Debug;
//! init_logging(&config);
//!
//! tracing::info!(checks = 512, "matrix loaded");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-iteration decoder traces.
    Trace,
    /// Debug detail.
    Debug,
    /// Normal operation (default).
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Machine-readable JSON lines.
    Json,
    /// Human-readable, colored.
    Pretty,
    /// One line per event.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Compact
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level threshold, overridden by `RUST_LOG` when set.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Include thread ids — useful when decodes run one per slot.
    pub thread_ids: bool,
    /// Explicit filter directive (e.g. `"qkr_core::decoder=trace"`).
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            thread_ids: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Verbose configuration mirroring the decoders' iteration dumps.
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Trace,
            format: LogFormat::Pretty,
            thread_ids: true,
            ..Default::default()
        }
    }
}

/// Installs the global subscriber. Call once at startup; later calls are
/// silently ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = if let Some(ref custom) = config.filter {
        EnvFilter::try_new(custom).unwrap_or_else(|_| EnvFilter::new(config.level.to_string()))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()))
    };

    let result = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_thread_ids(config.thread_ids)),
        ),
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty().with_thread_ids(config.thread_ids)),
        ),
        LogFormat::Compact => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_thread_ids(config.thread_ids)),
        ),
    };

    // A subscriber may already be installed.
    let _ = result;
}
