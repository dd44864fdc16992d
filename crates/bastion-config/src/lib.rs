//! Typed configuration for Bastion.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - Strict parsing (unknown fields fail)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [firewall]
//! allowed_methods = ["GET", "POST"]
//! allow_semicolon = false
//! allowed_hostnames = ["api.example.com"]
//!
//! [dispatch]
//! debug = false
//! fail_on_empty = true
//! rejection_status = 400
//!
//! [logging]
//! level = "bastion_middleware=debug,info"
//! format = "json"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use bastion_config::ConfigLoader;
//!
//! # fn main() -> Result<(), bastion_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("bastion.toml")?
//!     .with_env_prefix("BASTION")
//!     .load()?;
//!
//! bastion_telemetry::init_logging(&config.logging.to_log_config()).ok();
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/bastion-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::BastionConfig;
pub use error::{ConfigError, ConfigSource};
pub use loader::ConfigLoader;
pub use schema::{
    DispatchConfig, FirewallConfig, LogFormat, LoggingConfig, DEFAULT_ALLOWED_METHODS,
};
