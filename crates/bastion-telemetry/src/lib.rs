//! Logging setup for Bastion services.
//!
//! Every Bastion crate emits structured events through `tracing`. The
//! dispatch engine logs at `trace` for each matcher attempt and middleware
//! invocation, `debug` when a request is secured, and `warn` for firewall
//! rejections. [`init_logging`] installs a `tracing-subscriber` registry
//! that filters and formats those events.
//!
//! ```rust,ignore
//! use bastion_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_level("bastion_middleware=debug,info"))?;
//! ```

#![doc(html_root_url = "https://docs.rs/bastion-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogOutput, DISPATCH_TARGET};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
