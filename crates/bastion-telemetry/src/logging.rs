//! Subscriber setup for the events Bastion emits.
//!
//! The dispatch engine logs each matcher attempt and middleware invocation
//! at `trace` under the `bastion_middleware` target, secured requests at
//! `debug` and firewall rejections at `warn`. [`LogConfig`] picks the
//! filter and the output format; [`init_logging`] installs it.
//!
//! # Example
//!
//! ```rust,ignore
//! use bastion_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development().with_dispatch_trace())?;
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Target under which chain selection and middleware invocation are logged.
pub const DISPATCH_TARGET: &str = "bastion_middleware";

/// How log events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Installs nothing when false.
    pub enabled: bool,

    /// `EnvFilter` directive, e.g. `"info"` or `"bastion_firewall=debug,warn"`.
    pub level: String,

    /// Output format.
    pub output: LogOutput,

    /// Emit span open/close events.
    pub span_events: bool,

    /// Include source file and line.
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty output at `debug`, with span events and locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            output: LogOutput::Pretty,
            span_events: true,
            include_location: true,
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            output: LogOutput::Json,
            span_events: false,
            include_location: false,
        }
    }

    /// Replaces the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Adds `trace` for the dispatch engine on top of the current directive,
    /// so that every matcher attempt and middleware invocation is logged.
    #[must_use]
    pub fn with_dispatch_trace(mut self) -> Self {
        let directive = format!("{DISPATCH_TARGET}=trace");
        if !self.level.split(',').any(|d| d.trim() == directive) {
            if !self.level.trim().is_empty() {
                self.level.push(',');
            }
            self.level.push_str(&directive);
        }
        self
    }
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// - [`TelemetryError::InvalidFilter`] if `config.level` does not parse
/// - [`TelemetryError::LoggingInit`] if a global subscriber is already set
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location);
    let layer = match config.output {
        LogOutput::Json => layer.json().boxed(),
        LogOutput::Pretty => layer.pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a filter directive such as `"info"` or `"bastion_firewall=debug,warn"`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the directive is malformed.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: filter.to_string(),
        message: e.to_string(),
    })
}
