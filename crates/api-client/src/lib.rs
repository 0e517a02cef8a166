//! HTTP client core for the Petstore API test harness
//!
//! This crate builds every request the harness sends and observes every
//! response it receives:
//!
//! - **Configuration**: environment-specific TOML settings, loaded once per process
//! - **Request specs**: per-call contexts pre-populated with base URL, auth and content type
//! - **Middleware chain**: composable interceptors around the network call
//! - **Logging middleware**: structured request/response records via `tracing`
//! - **Endpoints**: typed access to the pet, store and user resources
//!
//! # Example
//!
//! ```rust,no_run
//! use petstore_api_client::{ConfigProvider, PetstoreClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads config/<PETSTORE_ENV>.toml on first access
//!     let provider = ConfigProvider::from_env();
//!     let client = PetstoreClient::from_provider(&provider)?;
//!
//!     let response = client.store().inventory().await?;
//!     println!("Inventory status: {}", response.status_code());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod exchange;
pub mod middleware;
pub mod models;
pub mod transport;

pub use client::{ClientBuilder, PetstoreClient, RequestSpec};
pub use config::{Config, ConfigProvider, ConfigSource};
pub use error::{ApiError, ApiResult, ConfigError};
pub use exchange::{ApiRequest, ApiResponse};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{PetstoreClient, RequestSpec};
    pub use crate::config::{Config, ConfigProvider, ConfigSource};
    pub use crate::endpoints::{PetApi, StoreApi, UserApi};
    pub use crate::error::{ApiError, ApiResult, ConfigError};
    pub use crate::exchange::{ApiRequest, ApiResponse};
    pub use crate::middleware::{LoggingMiddleware, Middleware, Next, Pipeline};
    pub use crate::models::{ApiMessage, Category, Order, OrderStatus, Pet, PetStatus, Tag, User};
    pub use crate::transport::{Dispatch, ReqwestDispatcher};
}
