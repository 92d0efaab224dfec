//! Shared configuration types for Curator services
//!
//! This crate holds the connection settings for the two remote services the
//! worker talks to (Plex and the local language model) together with the
//! environment helpers every binary uses to read them.

mod error;
mod ollama;
mod plex;

pub use error::{ConfigError, ConfigResult};
pub use ollama::OllamaConfig;
pub use plex::PlexConfig;

use std::env;

/// Connection configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Plex media server configuration
    pub plex: PlexConfig,

    /// Language model endpoint configuration
    pub ollama: OllamaConfig,
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            plex: PlexConfig::from_env()?,
            ollama: OllamaConfig::from_env()?,
        })
    }
}

/// Log filter directive, `RUST_LOG` taking precedence over `LOG_LEVEL`
pub fn log_level_from_env() -> String {
    env::var("RUST_LOG")
        .or_else(|_| env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| "info".to_string())
}

/// Get a required environment variable, rejecting blank values
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    let value = env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue(name.to_string()));
    }
    Ok(value)
}

/// Get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into a specific type, falling back to `default` when unset
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => parse_value(name, &val),
        Err(_) => Ok(default),
    }
}

/// Parse a required environment variable into a specific type
pub fn parse_required_env<T>(name: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let val = get_required_env(name)?;
    parse_value(name, &val)
}

/// Parse an environment variable that may be absent
pub fn parse_optional_env<T>(name: &str) -> ConfigResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => parse_value(name, &val).map(Some),
        Err(_) => Ok(None),
    }
}

/// Split a comma-separated variable into trimmed, non-empty entries
///
/// Returns `ValidationError` when nothing is left after trimming.
pub fn parse_list_env(name: &str) -> ConfigResult<Vec<String>> {
    let raw = get_required_env(name)?;
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} must list at least one entry",
            name
        )));
    }
    Ok(items)
}

/// Check that `value` is an absolute http(s) URL
pub fn validate_url(name: &str, value: &str) -> ConfigResult<()> {
    let parsed = url::Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl(
            name.to_string(),
            format!("unsupported scheme '{}'", other),
        )),
    }
}

fn parse_value<T>(name: &str, val: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_get_required_env_missing() {
        temp_env::with_var_unset("CURATOR_TEST_REQUIRED", || {
            assert_matches!(
                get_required_env("CURATOR_TEST_REQUIRED"),
                Err(ConfigError::MissingEnvVar(name)) if name == "CURATOR_TEST_REQUIRED"
            );
        });
    }

    #[test]
    fn test_get_required_env_blank() {
        temp_env::with_var("CURATOR_TEST_REQUIRED", Some("   "), || {
            assert_matches!(
                get_required_env("CURATOR_TEST_REQUIRED"),
                Err(ConfigError::EmptyValue(_))
            );
        });
    }

    #[test]
    fn test_parse_env_default_and_value() {
        temp_env::with_var_unset("CURATOR_TEST_NUM", || {
            assert_eq!(parse_env("CURATOR_TEST_NUM", 86400u64).unwrap(), 86400);
        });
        temp_env::with_var("CURATOR_TEST_NUM", Some(" 60 "), || {
            assert_eq!(parse_env("CURATOR_TEST_NUM", 86400u64).unwrap(), 60);
        });
    }

    #[test]
    fn test_parse_required_env_rejects_garbage() {
        temp_env::with_var("CURATOR_TEST_NUM", Some("ten"), || {
            assert_matches!(
                parse_required_env::<u32>("CURATOR_TEST_NUM"),
                Err(ConfigError::InvalidValue(..))
            );
        });
    }

    #[test]
    fn test_parse_required_env_negative_unsigned() {
        temp_env::with_var("CURATOR_TEST_NUM", Some("-5"), || {
            assert!(parse_required_env::<u32>("CURATOR_TEST_NUM").is_err());
        });
    }

    #[test]
    fn test_parse_optional_env() {
        temp_env::with_var_unset("CURATOR_TEST_OPT", || {
            assert_eq!(parse_optional_env::<u64>("CURATOR_TEST_OPT").unwrap(), None);
        });
        temp_env::with_var("CURATOR_TEST_OPT", Some(""), || {
            assert_eq!(parse_optional_env::<u64>("CURATOR_TEST_OPT").unwrap(), None);
        });
        temp_env::with_var("CURATOR_TEST_OPT", Some("7"), || {
            assert_eq!(parse_optional_env::<u64>("CURATOR_TEST_OPT").unwrap(), Some(7));
        });
    }

    #[test]
    fn test_parse_list_env_trims_and_drops_empty() {
        temp_env::with_var("CURATOR_TEST_LIST", Some(" Movies , ,Kids Movies,"), || {
            assert_eq!(
                parse_list_env("CURATOR_TEST_LIST").unwrap(),
                vec!["Movies".to_string(), "Kids Movies".to_string()]
            );
        });
    }

    #[test]
    fn test_parse_list_env_only_commas() {
        temp_env::with_var("CURATOR_TEST_LIST", Some(" , ,"), || {
            assert_matches!(
                parse_list_env("CURATOR_TEST_LIST"),
                Err(ConfigError::ValidationError(_))
            );
        });
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("PLEX_URL", "http://192.168.1.10:32400").is_ok());
        assert!(validate_url("PLEX_URL", "https://plex.example.com").is_ok());
        assert_matches!(
            validate_url("PLEX_URL", "not a url"),
            Err(ConfigError::InvalidUrl(..))
        );
        assert_matches!(
            validate_url("PLEX_URL", "ftp://plex.example.com"),
            Err(ConfigError::InvalidUrl(..))
        );
    }

    #[test]
    fn test_log_level_precedence() {
        temp_env::with_vars(
            [("RUST_LOG", Some("curator_worker=debug")), ("LOG_LEVEL", Some("warn"))],
            || assert_eq!(log_level_from_env(), "curator_worker=debug"),
        );
        temp_env::with_vars(
            [("RUST_LOG", None), ("LOG_LEVEL", Some("warn"))],
            || assert_eq!(log_level_from_env(), "warn"),
        );
        temp_env::with_vars(
            [("RUST_LOG", None::<&str>), ("LOG_LEVEL", None)],
            || assert_eq!(log_level_from_env(), "info"),
        );
    }
}
