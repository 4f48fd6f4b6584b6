//! Configuration management for the content service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file in the working directory is read first when present.
//!
//! Unlike the collector settings, which may be partially absent (the sink
//! is then simply disabled), numeric values that are present but
//! unparseable are startup errors.

use content_core::pagination::{PageSizePolicy, PolicyError, MAX_PAGE_SIZE_CEILING};
use content_runtime::{SinkConfig, DEFAULT_MAX_IN_FLIGHT};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default listening port.
const DEFAULT_PORT: u16 = 8080;

/// Default page size when `DEFAULT_PAGE_SIZE` is unset.
const DEFAULT_PAGE_SIZE: u64 = 10;

/// Default per-request deadline in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric variable was present but could not be parsed
    #[error("Invalid numeric env var {name}: {value:?}")]
    InvalidNumber {
        /// Variable name
        name: &'static str,
        /// Raw value found
        value: String,
    },

    /// Page size settings out of range
    #[error("Invalid page size settings: {0}")]
    PageSize(#[from] PolicyError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Remote log collector settings
    pub sink: SinkConfig,
    /// Page size defaults and ceiling
    pub pagination: PageSizePolicy,
    /// Prefix for asset paths (language icons); `None` serves raw paths
    pub assets_base_url: Option<String>,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Deadline for one request
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable is unparseable or the
    /// page size settings are out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let server = ServerConfig {
            host: vars.string("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: vars.number("PORT")?.unwrap_or(DEFAULT_PORT),
            request_timeout: Duration::from_secs(
                vars.number("REQUEST_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        };

        let sink = SinkConfig {
            base_url: vars.string("LOGGING_SERVICE_URL"),
            api_path: vars.string("LOGGING_SERVICE_API_PATH"),
            timeout: vars
                .number::<u64>("LOGGING_SERVICE_TIMEOUT")?
                .map(Duration::from_millis),
            service: vars.string("SERVICE_NAME"),
            max_in_flight: vars
                .number("LOGGING_SERVICE_MAX_IN_FLIGHT")?
                .unwrap_or(DEFAULT_MAX_IN_FLIGHT),
        };

        let pagination = PageSizePolicy::new(
            vars.number("DEFAULT_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE),
            vars.number("MAX_PAGE_SIZE")?.unwrap_or(MAX_PAGE_SIZE_CEILING),
        )?;

        let assets_base_url = vars
            .string("ASSETS_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            server,
            sink,
            pagination,
            assets_base_url,
        })
    }

    /// Socket address string for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

struct Vars<L>(L);

impl<L> Vars<L>
where
    L: Fn(&str) -> Option<String>,
{
    /// Trimmed, non-empty value.
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn number<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, ConfigError> {
        self.string(name)
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { name, value })
            })
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout, Duration::from_secs(30));
        assert_eq!(config.pagination.default_limit(), 10);
        assert_eq!(config.pagination.max_limit(), 30);
        assert_eq!(config.sink.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert!(!config.sink.is_complete());
        assert!(config.assets_base_url.is_none());
    }

    #[test]
    fn test_full_configuration() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3005"),
            ("SERVICE_NAME", "content-service"),
            ("LOGGING_SERVICE_URL", "http://logging:4000"),
            ("LOGGING_SERVICE_API_PATH", "/api/v1/logs"),
            ("LOGGING_SERVICE_TIMEOUT", "1500"),
            ("DEFAULT_PAGE_SIZE", "5"),
            ("MAX_PAGE_SIZE", "20"),
            ("ASSETS_BASE_URL", "https://cdn.example.com/"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3005");
        assert!(config.sink.is_complete());
        assert_eq!(config.sink.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.sink.service.as_deref(), Some("content-service"));
        assert_eq!(config.pagination.default_limit(), 5);
        assert_eq!(config.pagination.max_limit(), 20);
        assert_eq!(
            config.assets_base_url.as_deref(),
            Some("https://cdn.example.com")
        );
    }

    #[test]
    fn test_partial_sink_config_is_not_an_error() {
        let config = load(&[("LOGGING_SERVICE_URL", "http://logging:4000")]).unwrap();
        assert!(!config.sink.is_complete());
    }

    #[test]
    fn test_unparseable_number_is_rejected() {
        let err = load(&[("LOGGING_SERVICE_TIMEOUT", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name: "LOGGING_SERVICE_TIMEOUT", .. }
        ));
        assert!(err.to_string().contains("LOGGING_SERVICE_TIMEOUT"));
    }

    #[test]
    fn test_max_page_size_above_ceiling_is_rejected() {
        let err = load(&[("MAX_PAGE_SIZE", "31")]).unwrap_err();
        assert!(matches!(err, ConfigError::PageSize(PolicyError::AboveCeiling(31))));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = load(&[("PORT", "  "), ("SERVICE_NAME", "")]).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.sink.service.is_none());
    }
}
