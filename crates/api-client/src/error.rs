//! Error types for the API client

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Configuration could not be located, read, parsed or validated
///
/// Raised on first access to the [`ConfigProvider`](crate::config::ConfigProvider).
/// No client can be built without a configuration, so callers treat this as fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The environment-specific file does not exist
    #[error("Configuration file not found: {}", path.display())]
    NotFound {
        /// Path that was probed
        path: PathBuf,
    },

    /// The file exists but could not be read
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has wrongly typed values
    #[error("Failed to parse configuration file {}: {source}", path.display())]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// A required key is missing or a value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a validation error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Header name or value rejected
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The service answered with a status the caller did not accept
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },
}

impl ApiError {
    /// Create an unexpected status error
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Check if this error was caused by a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { status, .. } if *status >= 500)
    }
}
