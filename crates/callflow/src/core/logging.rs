//! Logging infrastructure for trace processing
//!
//! Structured logging through the `tracing` crate. The library only emits
//! spans and events; binaries decide whether and how to install a subscriber.
//!
//! # Usage
//!
//! ```rust,no_run
//! use callflow::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Environment Variables
//!
//! - `CALLFLOW_LOG_LEVEL`: log level or filter directive (trace|debug|info|warn|error|off)
//! - `RUST_LOG`: standard `tracing-subscriber` filter, used when the above is unset
//! - `CALLFLOW_LOG_FORMAT`: compact|pretty|json
//!
//! # Filtering Logs
//!
//! ```bash
//! # Watch classification decisions
//! RUST_LOG="callflow::core::synthesis=trace" callflow render -i traces.jsonl
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

pub const LOG_LEVEL_ENV: &str = "CALLFLOW_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "CALLFLOW_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Pick the log level: explicit value, then `CALLFLOW_LOG_LEVEL`, then `RUST_LOG`, then `info`
pub fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

/// Pick the log format: explicit value, then `CALLFLOW_LOG_FORMAT`, then compact
pub fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    match format
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_FORMAT_ENV).ok())
    {
        Some(name) => LogFormat::from_str(&name),
        None => Ok(LogFormat::default()),
    }
}

/// Initialize the global tracing subscriber
///
/// Returns an error for an unknown format, or when a subscriber is already
/// installed. Unparseable level directives fall back to `info`.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = resolve_level(level);
    let format = resolve_format(format).map_err(|e| format!("Invalid log format: {}", e))?;

    let filter = if log_level == "off" {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = Registry::default().with(filter);
    match format {
        LogFormat::Compact => registry
            .with(
                fmt::Layer::default()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                fmt::Layer::default()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::ACTIVE)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::Layer::default()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE)
                    .json(),
            )
            .try_init()?,
    }

    Ok(())
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
