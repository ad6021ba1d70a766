use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://langapp.lordbucket.eu/api";
pub const DEFAULT_DB_URL: &str = "sqlite://langapp.sqlite3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the REST API lives and how long to wait for it.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// Validate `base_url` and build a config with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse or is
    /// not an `http(s)` URL with a path.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".into()));
        }
        Ok(Self {
            base_url: parsed,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `LANGAPP_API_URL` and `LANGAPP_API_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("LANGAPP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let mut config = Self::new(&base_url)?;
        if let Ok(raw) = env::var("LANGAPP_API_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "LANGAPP_API_TIMEOUT_SECS",
                    raw,
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Everything needed to assemble [`crate::AppServices`].
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub db_url: String,
}

impl AppConfig {
    /// Read API settings plus `LANGAPP_DB_URL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api = ApiConfig::from_env()?;
        let db_url = env::var("LANGAPP_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.into());
        Ok(Self { api, db_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_base_with_path() {
        let config = ApiConfig::new("http://localhost:8080/api").unwrap();
        assert_eq!(config.base_url().path(), "/api");
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn rejects_garbage_and_non_http_urls() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("mailto:someone@example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(ApiConfig::new("ftp://example.com/api").is_err());
    }

    #[test]
    fn default_url_is_valid() {
        assert!(ApiConfig::new(DEFAULT_API_URL).is_ok());
    }
}
