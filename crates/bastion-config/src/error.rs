//! Configuration error types.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where a configuration document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file on disk.
    File(PathBuf),
    /// A string handed to [`ConfigLoader::with_string`](crate::ConfigLoader::with_string).
    Inline,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline => f.write_str("inline configuration"),
        }
    }
}

/// Errors raised while loading or validating a [`BastionConfig`](crate::BastionConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is neither TOML nor JSON.
    #[error("{origin}: unsupported configuration format '{format}', expected toml or json")]
    UnsupportedFormat {
        /// Where the document came from.
        origin: ConfigSource,
        /// The format or file extension that was given.
        format: String,
    },

    /// The document does not deserialize, including unknown keys.
    #[error("{origin}: {message}")]
    Malformed {
        /// Where the document came from.
        origin: ConfigSource,
        /// Parser message with the offending key or position.
        message: String,
    },

    /// A `.env` file exists but could not be loaded.
    #[error("failed to load .env file")]
    Dotenv(#[from] dotenvy::Error),

    /// An environment override does not parse.
    #[error("environment variable {var}: {reason}")]
    Env {
        /// The full variable name, prefix included.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// A loaded value fails validation.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted key of the offending value, e.g. `dispatch.rejection_status`.
        field: String,
        /// Why the value was refused.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(origin: ConfigSource, error: impl fmt::Display) -> Self {
        Self::Malformed {
            origin,
            message: error.to_string(),
        }
    }

    /// Returns the configuration key or environment variable at fault, if
    /// the error concerns a single setting.
    #[must_use]
    pub fn setting(&self) -> Option<&str> {
        match self {
            Self::Env { var, .. } => Some(var),
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_document() {
        let err = ConfigError::UnsupportedFormat {
            origin: ConfigSource::File(PathBuf::from("/etc/bastion/bastion.ini")),
            format: "ini".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "/etc/bastion/bastion.ini: unsupported configuration format 'ini', expected toml or json"
        );

        let err = ConfigError::malformed(ConfigSource::Inline, "unknown field `allow_everything`");
        assert_eq!(
            err.to_string(),
            "inline configuration: unknown field `allow_everything`"
        );
    }

    #[test]
    fn test_setting() {
        let err = ConfigError::env("BASTION__DISPATCH__DEBUG", "expected boolean");
        assert_eq!(err.setting(), Some("BASTION__DISPATCH__DEBUG"));
        assert_eq!(
            err.to_string(),
            "environment variable BASTION__DISPATCH__DEBUG: expected boolean"
        );

        let err = ConfigError::invalid_value("dispatch.rejection_status", "302 is not 4xx or 5xx");
        assert_eq!(err.setting(), Some("dispatch.rejection_status"));

        let err = ConfigError::FileNotFound {
            path: PathBuf::from("bastion.toml"),
        };
        assert_eq!(err.setting(), None);
    }
}
