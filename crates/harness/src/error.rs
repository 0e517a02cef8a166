//! Error types for the test harness

use petstore_api_client::{ApiError, ConfigError};
use thiserror::Error;

/// Failures that prevent a test case from being set up or run
///
/// Cleanup failures are not represented here: teardown logs them and reports
/// them in a [`DrainReport`](crate::tracker::DrainReport) instead.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Client construction or a request failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type alias for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
