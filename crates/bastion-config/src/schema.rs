//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones with the
//! strict defaults below.

use bastion_telemetry::LogOutput;
use serde::{Deserialize, Serialize};

/// Methods the firewall accepts unless configured otherwise.
pub const DEFAULT_ALLOWED_METHODS: [&str; 7] =
    ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];

/// Firewall configuration section.
///
/// Each `allow_*` toggle relaxes one strict rule. All toggles default to
/// `false`, so an empty section yields the strictest firewall.
///
/// # Example
///
/// ```
/// use bastion_config::FirewallConfig;
///
/// let config: FirewallConfig = toml::from_str(r#"
///     allow_semicolon = true
///     allowed_hostnames = ["api.example.com"]
/// "#).unwrap();
///
/// assert!(config.allow_semicolon);
/// assert!(!config.allow_backslash);
/// assert_eq!(config.allowed_methods.len(), 7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FirewallConfig {
    /// Accepted HTTP methods. Ignored when `allow_any_method` is set.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// Accept every HTTP method.
    #[serde(default)]
    pub allow_any_method: bool,

    /// Accept `;` in the path. Path parameters are stripped for matching.
    #[serde(default)]
    pub allow_semicolon: bool,

    /// Accept `%2F` in the path.
    #[serde(default)]
    pub allow_url_encoded_slash: bool,

    /// Accept `%2F%2F` in the path. Requires `allow_url_encoded_slash`.
    #[serde(default)]
    pub allow_url_encoded_double_slash: bool,

    /// Accept `%2E` in the path.
    #[serde(default)]
    pub allow_url_encoded_period: bool,

    /// Accept `\` and `%5C` in the path.
    #[serde(default)]
    pub allow_backslash: bool,

    /// Accept `%00` in the path.
    #[serde(default)]
    pub allow_null: bool,

    /// Accept `%25` in the path.
    #[serde(default)]
    pub allow_url_encoded_percent: bool,

    /// Accept `%0D` in the path.
    #[serde(default)]
    pub allow_url_encoded_carriage_return: bool,

    /// Accept `%0A` in the path.
    #[serde(default)]
    pub allow_url_encoded_line_feed: bool,

    /// Accept `%E2%80%A8` in the path.
    #[serde(default)]
    pub allow_url_encoded_line_separator: bool,

    /// Accept `%E2%80%A9` in the path.
    #[serde(default)]
    pub allow_url_encoded_paragraph_separator: bool,

    /// Accepted `Host` names. Empty accepts any host.
    #[serde(default)]
    pub allowed_hostnames: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            allowed_methods: default_allowed_methods(),
            allow_any_method: false,
            allow_semicolon: false,
            allow_url_encoded_slash: false,
            allow_url_encoded_double_slash: false,
            allow_url_encoded_period: false,
            allow_backslash: false,
            allow_null: false,
            allow_url_encoded_percent: false,
            allow_url_encoded_carriage_return: false,
            allow_url_encoded_line_feed: false,
            allow_url_encoded_line_separator: false,
            allow_url_encoded_paragraph_separator: false,
            allowed_hostnames: Vec::new(),
        }
    }
}

fn default_allowed_methods() -> Vec<String> {
    DEFAULT_ALLOWED_METHODS.iter().map(ToString::to_string).collect()
}

/// Dispatch engine configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Log every request line and its selected middleware at `info`.
    #[serde(default)]
    pub debug: bool,

    /// Fail assembly when no chain, configurer or ignore rule is given,
    /// instead of synthesizing an empty universal chain.
    #[serde(default)]
    pub fail_on_empty: bool,

    /// Status code for rejected requests, sent with an empty body.
    /// When unset, rejections get a JSON 400 error envelope.
    #[serde(default)]
    pub rejection_status: Option<u16>,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (`info`, `bastion_middleware=trace,info`, ...).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Emit span open/close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the telemetry crate's settings.
    #[must_use]
    pub fn to_log_config(&self) -> bastion_telemetry::LogConfig {
        bastion_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            output: match self.format {
                LogFormat::Json => LogOutput::Json,
                LogFormat::Pretty => LogOutput::Pretty,
            },
            span_events: self.span_events,
            include_location: self.include_location,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
