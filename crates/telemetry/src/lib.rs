//! Log sink setup for the Petstore API test harness
//!
//! Every component logs through `tracing`; this crate installs the subscriber
//! that turns those records into output:
//! - Compact human-readable lines, or JSON for machine consumption
//! - Level filtering via `RUST_LOG`, falling back to the configured level
//! - A per-process session ID for correlating records of one test run

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize logging with configuration from the environment
pub fn init() -> anyhow::Result<()> {
    init_with_config(&TelemetryConfig::from_env())
}

/// Initialize with custom configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_with_config(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(
            tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .with_target(config.show_target)
                    .with_thread_ids(config.show_thread_ids)
                    .with_test_writer()
                    .compact(),
            ),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .with_target(config.show_target)
                    .with_thread_ids(config.show_thread_ids)
                    .with_test_writer()
                    .json(),
            ),
        ),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Output format of log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One compact line per record
    Compact,
    /// One JSON object per record
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "compact" | "text" | "pretty" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub show_target: bool,
    pub show_thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
        }
    }
}

impl TelemetryConfig {
    /// Read `PETSTORE_LOG_LEVEL` and `PETSTORE_LOG_FORMAT`, keeping defaults for unset values
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(level) = lookup("PETSTORE_LOG_LEVEL").filter(|l| !l.is_empty()) {
            config.log_level = level;
        }
        if let Some(format) = lookup("PETSTORE_LOG_FORMAT").and_then(|f| LogFormat::parse(&f)) {
            config.format = format;
        }
        config
    }
}
