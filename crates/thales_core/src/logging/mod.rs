//! Logging infrastructure for Thales.
//!
//! This module provides:
//! - Per-run loggers with console callback + file dual output
//! - Message prefixes for warnings and errors
//! - Tail buffer of diagnostic lines shown after a failure
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use thales_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new(
//!     "batch",
//!     Some("/path/to/logs"),
//!     LogConfig::default(),
//!     Some(Box::new(|line: &str| println!("{}", line))),
//! ).unwrap();
//!
//! logger.banner(Some("Processing pair 1/2: video_1.mp4"));
//! logger.warn("No detection results for video_2.mp4");
//! ```

mod run_logger;
mod types;

pub use run_logger::{RunLogger, RunLoggerBuilder};
pub use types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
