//! Configuration loader with layered approach.
//!
//! Layers apply in order, each overriding the previous one:
//! 1. Default values (built into the code)
//! 2. Configuration file (TOML or JSON)
//! 3. Environment variables

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{BastionConfig, ConfigError, ConfigSource, LogFormat};

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use bastion_config::ConfigLoader;
///
/// # fn main() -> Result<(), bastion_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("bastion.toml")?
///     .with_env_prefix("BASTION")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BastionConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BastionConfig::default(),
            env_prefix: None,
        }
    }

    /// Start from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = BastionConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = BastionConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON or unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let format = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.config = parse(&content, format, ConfigSource::File(path.to_path_buf()))?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use bastion_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[dispatch]\ndebug = true\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.dispatch.debug);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format, ConfigSource::Inline)?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `BASTION__FIREWALL__ALLOW_SEMICOLON=true`. List values are
    /// comma-separated.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file in the working directory, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse or
    /// the final configuration fails validation.
    pub fn load(mut self) -> Result<BastionConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: HashMap<String, String> = env::vars()
                .filter(|(k, _)| k.starts_with(&prefix))
                .collect();
            self.apply_overrides(&prefix, &vars)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without validation or environment overrides.
    #[must_use]
    pub fn load_unvalidated(self) -> BastionConfig {
        self.config
    }

    fn apply_overrides(
        &mut self,
        prefix: &str,
        vars: &HashMap<String, String>,
    ) -> Result<(), ConfigError> {
        for (key, value) in vars {
            self.apply_env_var(key, value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let firewall = &mut self.config.firewall;
        let flag = || {
            parse_bool(value).ok_or_else(|| ConfigError::env(key, "expected boolean"))
        };

        match parts.as_slice() {
            ["FIREWALL", "ALLOWED_METHODS"] => {
                firewall.allowed_methods = parse_list(value).map(str::to_uppercase).collect();
            }
            ["FIREWALL", "ALLOWED_HOSTNAMES"] => {
                firewall.allowed_hostnames = parse_list(value).map(ToString::to_string).collect();
            }
            ["FIREWALL", "ALLOW_ANY_METHOD"] => firewall.allow_any_method = flag()?,
            ["FIREWALL", "ALLOW_SEMICOLON"] => firewall.allow_semicolon = flag()?,
            ["FIREWALL", "ALLOW_URL_ENCODED_SLASH"] => firewall.allow_url_encoded_slash = flag()?,
            ["FIREWALL", "ALLOW_URL_ENCODED_DOUBLE_SLASH"] => {
                firewall.allow_url_encoded_double_slash = flag()?;
            }
            ["FIREWALL", "ALLOW_URL_ENCODED_PERIOD"] => {
                firewall.allow_url_encoded_period = flag()?;
            }
            ["FIREWALL", "ALLOW_BACKSLASH"] => firewall.allow_backslash = flag()?,
            ["FIREWALL", "ALLOW_NULL"] => firewall.allow_null = flag()?,
            ["FIREWALL", "ALLOW_URL_ENCODED_PERCENT"] => {
                firewall.allow_url_encoded_percent = flag()?;
            }
            ["FIREWALL", "ALLOW_URL_ENCODED_CARRIAGE_RETURN"] => {
                firewall.allow_url_encoded_carriage_return = flag()?;
            }
            ["FIREWALL", "ALLOW_URL_ENCODED_LINE_FEED"] => {
                firewall.allow_url_encoded_line_feed = flag()?;
            }
            ["FIREWALL", "ALLOW_URL_ENCODED_LINE_SEPARATOR"] => {
                firewall.allow_url_encoded_line_separator = flag()?;
            }
            ["FIREWALL", "ALLOW_URL_ENCODED_PARAGRAPH_SEPARATOR"] => {
                firewall.allow_url_encoded_paragraph_separator = flag()?;
            }

            ["DISPATCH", "DEBUG"] => self.config.dispatch.debug = flag()?,
            ["DISPATCH", "FAIL_ON_EMPTY"] => self.config.dispatch.fail_on_empty = flag()?,
            ["DISPATCH", "REJECTION_STATUS"] => {
                self.config.dispatch.rejection_status = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        ConfigError::env(key, "expected status code")
                    })?)
                };
            }

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = flag()?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "SPAN_EVENTS"] => self.config.logging.span_events = flag()?,
            ["LOGGING", "INCLUDE_LOCATION"] => self.config.logging.include_location = flag()?,

            _ => {}
        }

        Ok(())
    }
}

fn parse(
    content: &str,
    format: &str,
    origin: ConfigSource,
) -> Result<BastionConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => {
            toml::from_str(content).map_err(|e| ConfigError::malformed(origin, e.message()))
        }
        "json" => serde_json::from_str(content).map_err(|e| ConfigError::malformed(origin, e)),
        _ => Err(ConfigError::UnsupportedFormat {
            origin,
            format: format.to_string(),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, BastionConfig::default());
    }

    #[test]
    fn test_with_string_toml() {
        let toml = r#"
            [firewall]
            allow_semicolon = true
            allowed_methods = ["GET", "POST"]

            [dispatch]
            rejection_status = 403
        "#;
        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert!(config.firewall.allow_semicolon);
        assert_eq!(config.firewall.allowed_methods, vec!["GET", "POST"]);
        assert_eq!(config.dispatch.rejection_status, Some(403));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_with_string_json() {
        let json = r#"{"dispatch": {"debug": true}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(config.dispatch.debug);
    }

    #[test]
    fn test_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedFormat {
                origin: ConfigSource::Inline,
                format,
            }) if format == "yaml"
        ));
    }

    #[test]
    fn test_with_string_unknown_field() {
        let err = ConfigLoader::new()
            .with_string("[firewall]\nallow_everything = true\n", "toml")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Malformed {
                origin: ConfigSource::Inline,
                ..
            }
        ));
        assert!(err.to_string().contains("allow_everything"));
    }

    #[test]
    fn test_with_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[firewall]\nallowed_hostnames = [\"example.com\"]").unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.firewall.allowed_hostnames, vec!["example.com"]);
    }

    #[test]
    fn test_with_file_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedFormat { ref format, .. } if format == "ini"
        ));
        assert!(err.to_string().starts_with(&file.path().display().to_string()));
    }

    #[test]
    fn test_with_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::new().with_file(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_with_optional_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .with_optional_file(dir.path().join("missing.toml"))
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, BastionConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_overrides(
                "BASTION",
                &vars(&[
                    ("BASTION__FIREWALL__ALLOW_SEMICOLON", "true"),
                    ("BASTION__FIREWALL__ALLOWED_METHODS", "get, post ,"),
                    ("BASTION__FIREWALL__ALLOWED_HOSTNAMES", "a.example,b.example"),
                    ("BASTION__DISPATCH__DEBUG", "yes"),
                    ("BASTION__DISPATCH__REJECTION_STATUS", "404"),
                    ("BASTION__LOGGING__FORMAT", "pretty"),
                    ("BASTION__UNKNOWN__KEY", "ignored"),
                ]),
            )
            .unwrap();

        let config = loader.load_unvalidated();
        assert!(config.firewall.allow_semicolon);
        assert_eq!(config.firewall.allowed_methods, vec!["GET", "POST"]);
        assert_eq!(
            config.firewall.allowed_hostnames,
            vec!["a.example", "b.example"]
        );
        assert!(config.dispatch.debug);
        assert_eq!(config.dispatch.rejection_status, Some(404));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_override_bad_bool() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_overrides(
            "BASTION",
            &vars(&[("BASTION__FIREWALL__ALLOW_NULL", "maybe")]),
        );
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_env_override_bad_status() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_overrides(
            "BASTION",
            &vars(&[("BASTION__DISPATCH__REJECTION_STATUS", "forbidden")]),
        );
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[dispatch]\nrejection_status = 302\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
