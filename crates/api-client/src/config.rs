//! Configuration for the Petstore API client
//!
//! Settings are read once per process from an environment-specific TOML file
//! (`<dir>/<environment>.toml`) made of dotted keys:
//!
//! ```toml
//! base.url = "https://petstore.swagger.io/v2"
//! api.key = "special-key"
//! timeout.connection = 10000
//! timeout.response = 30000
//! ```

use crate::error::ConfigError;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Environment used when `PETSTORE_ENV` is not set
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Directory searched when `PETSTORE_CONFIG_DIR` is not set
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default connection timeout in milliseconds
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 10_000;

/// Default response timeout in milliseconds
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 30_000;

/// Resolved, immutable client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the service under test
    pub base_url: String,
    /// Value sent in the `api_key` header
    pub api_key: String,
    /// Maximum time to establish a connection
    pub connection_timeout: Duration,
    /// Maximum time for a whole request/response exchange
    pub response_timeout: Duration,
    /// Name of the environment the settings were loaded for
    pub environment: String,
}

impl Config {
    /// Create a configuration with default timeouts
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            connection_timeout: Duration::from_millis(DEFAULT_CONNECTION_TIMEOUT_MS),
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }

    /// Load and validate configuration from a source
    pub fn load(source: &ConfigSource) -> Result<Self, ConfigError> {
        let path = source.path();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded configuration file");

        let base_url = source
            .base_url_override
            .clone()
            .or(raw.base.url)
            .ok_or_else(|| ConfigError::invalid("base.url is required"))?;
        let api_key = source
            .api_key_override
            .clone()
            .or(raw.api.key)
            .ok_or_else(|| ConfigError::invalid("api.key is required"))?;

        let config = Self {
            base_url,
            api_key,
            connection_timeout: Duration::from_millis(
                raw.timeout.connection.unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS),
            ),
            response_timeout: Duration::from_millis(
                raw.timeout.response.unwrap_or(DEFAULT_RESPONSE_TIMEOUT_MS),
            ),
            environment: source.environment.clone(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the environment name
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Builder-style method to set the connection timeout
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Builder-style method to set the response timeout
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::invalid("base.url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::invalid(
                "base.url must start with http:// or https://",
            ));
        }

        if self.api_key.is_empty() {
            return Err(ConfigError::invalid("api.key cannot be empty"));
        }

        if self.connection_timeout.is_zero() || self.response_timeout.is_zero() {
            return Err(ConfigError::invalid("timeouts cannot be zero"));
        }

        Ok(())
    }
}

/// On-disk layout, all keys optional so defaults and overrides can apply
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    base: BaseSection,
    api: ApiSection,
    timeout: TimeoutSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BaseSection {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSection {
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimeoutSection {
    connection: Option<u64>,
    response: Option<u64>,
}

/// Where configuration is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Directory holding one file per environment
    pub dir: PathBuf,
    /// Environment name, selects `<dir>/<environment>.toml`
    pub environment: String,
    /// Replaces `base.url` from the file
    pub base_url_override: Option<String>,
    /// Replaces `api.key` from the file
    pub api_key_override: Option<String>,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR, DEFAULT_ENVIRONMENT)
    }
}

impl ConfigSource {
    /// Create a source for an environment inside a directory
    pub fn new(dir: impl AsRef<Path>, environment: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            environment: environment.into(),
            base_url_override: None,
            api_key_override: None,
        }
    }

    /// Create a source from environment variables
    ///
    /// Reads the following environment variables:
    /// - `PETSTORE_ENV`: environment name (default `dev`)
    /// - `PETSTORE_CONFIG_DIR`: directory of the environment files (default `config`)
    /// - `PETSTORE_BASE_URL`: overrides `base.url`
    /// - `PETSTORE_API_KEY`: overrides `api.key`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create a source from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Exported-but-empty variables count as unset
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let dir = var("PETSTORE_CONFIG_DIR").unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());

        Self {
            dir: PathBuf::from(dir),
            environment: var("PETSTORE_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            base_url_override: var("PETSTORE_BASE_URL"),
            api_key_override: var("PETSTORE_API_KEY"),
        }
    }

    /// Builder-style method to override the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url_override = Some(url.into());
        self
    }

    /// Builder-style method to override the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key_override = Some(key.into());
        self
    }

    /// Path of the file for the selected environment
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.toml", self.environment))
    }
}

/// Lazily loads the configuration once and hands out the same instance
///
/// The first successful [`get`](Self::get) constructs the [`Config`]; later calls
/// return the same `Arc` without locking. A failed load is not cached.
#[derive(Debug)]
pub struct ConfigProvider {
    source: ConfigSource,
    cell: OnceCell<Arc<Config>>,
}

impl ConfigProvider {
    /// Create a provider that will load from `source` on first access
    pub fn new(source: ConfigSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Create a provider whose source is resolved from environment variables
    pub fn from_env() -> Self {
        Self::new(ConfigSource::from_env())
    }

    /// Get the configuration, loading it on first access
    pub fn get(&self) -> Result<Arc<Config>, ConfigError> {
        self.cell
            .get_or_try_init(|| {
                let config = Config::load(&self.source)?;
                info!(
                    environment = %config.environment,
                    base_url = %config.base_url,
                    "Configuration initialized"
                );
                Ok(Arc::new(config))
            })
            .map(Arc::clone)
    }

    /// Source this provider loads from
    #[must_use]
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

impl From<Config> for ConfigProvider {
    fn from(config: Config) -> Self {
        let source = ConfigSource::new(DEFAULT_CONFIG_DIR, config.environment.clone());
        Self {
            source,
            cell: OnceCell::with_value(Arc::new(config)),
        }
    }
}
