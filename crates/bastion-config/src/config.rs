//! Top-level configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DispatchConfig, FirewallConfig, LogFormat, LoggingConfig};

/// Complete Bastion configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use bastion_config::BastionConfig;
///
/// let config = BastionConfig::default();
/// assert!(!config.dispatch.debug);
/// assert!(!config.firewall.allow_semicolon);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BastionConfig {
    /// Firewall rules.
    #[serde(default)]
    pub firewall: FirewallConfig,

    /// Dispatch engine options.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BastionConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - an allowed method is not a valid HTTP method token
    /// - the method allow-list is empty while `allow_any_method` is off
    /// - an allowed host name is empty
    /// - `allow_url_encoded_double_slash` is set without `allow_url_encoded_slash`
    /// - `rejection_status` is not a 4xx or 5xx code
    /// - the logging filter directive does not parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        let firewall = &self.firewall;

        if !firewall.allow_any_method {
            if firewall.allowed_methods.is_empty() {
                return Err(ConfigError::invalid_value(
                    "firewall.allowed_methods",
                    "must not be empty unless allow_any_method is set",
                ));
            }
            for method in &firewall.allowed_methods {
                if http::Method::from_bytes(method.as_bytes()).is_err() {
                    return Err(ConfigError::invalid_value(
                        "firewall.allowed_methods",
                        format!("'{method}' is not a valid HTTP method"),
                    ));
                }
            }
        }

        if firewall.allowed_hostnames.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "firewall.allowed_hostnames",
                "host names must not be empty",
            ));
        }

        if firewall.allow_url_encoded_double_slash && !firewall.allow_url_encoded_slash {
            return Err(ConfigError::invalid_value(
                "firewall.allow_url_encoded_double_slash",
                "requires firewall.allow_url_encoded_slash",
            ));
        }

        if let Some(status) = self.dispatch.rejection_status {
            if !(400..=599).contains(&status) {
                return Err(ConfigError::invalid_value(
                    "dispatch.rejection_status",
                    format!("{status} is not a 4xx or 5xx status code"),
                ));
            }
        }

        if self.logging.enabled {
            bastion_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Development preset: debug dispatch logging, pretty `debug` output.
    ///
    /// ```
    /// use bastion_config::{BastionConfig, LogFormat};
    ///
    /// let config = BastionConfig::development();
    /// assert!(config.dispatch.debug);
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.dispatch.debug = true;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Production preset: fail on empty configuration, JSON `info` output.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.dispatch.fail_on_empty = true;
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}
