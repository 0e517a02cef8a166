//! Test harness for the Petstore API
//!
//! Builds on [`petstore_api_client`] with what a test case needs around the
//! requests it sends:
//!
//! - **Factory**: randomized, valid pets, orders and users with unique ids
//! - **Tracker**: registry of created resources, drained at teardown
//! - **Context**: setup/teardown scaffold that cleans up even when a test panics
//!
//! The functional suites live in `tests/`. They run against an in-process fake
//! service by default; enable the `live` feature to run them against the
//! environment selected by `PETSTORE_ENV`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod context;
pub mod error;
pub mod factory;
pub mod tracker;

pub use context::TestContext;
pub use error::{HarnessError, HarnessResult};
pub use tracker::{
    DrainReport, FailedCleanup, ResourceDeleter, ResourceKind, ResourceTracker, TrackedResource,
    TrackerState,
};

/// Prelude for test files
pub mod prelude {
    pub use crate::context::TestContext;
    pub use crate::error::{HarnessError, HarnessResult};
    pub use crate::factory;
    pub use crate::tracker::{DrainReport, ResourceDeleter, ResourceTracker, TrackedResource};
    pub use petstore_api_client::prelude::*;
}
