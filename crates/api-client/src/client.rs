//! Main API client implementation

use crate::config::{Config, ConfigProvider};
use crate::endpoints::{PetApi, StoreApi, UserApi};
use crate::error::{ApiError, ApiResult};
use crate::exchange::{ApiRequest, ApiResponse};
use crate::middleware::{LoggingMiddleware, Middleware, Pipeline};
use crate::transport::{Dispatch, ReqwestDispatcher};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// API key header expected by the Petstore
const API_KEY_HEADER: &str = "api_key";

/// Petstore API client
///
/// Holds the shared configuration and the middleware pipeline. Cloning is
/// cheap; every call starts from a fresh [`RequestSpec`].
#[derive(Clone, Debug)]
pub struct PetstoreClient {
    config: Arc<Config>,
    pipeline: Pipeline,
}

impl PetstoreClient {
    /// Create a client with the default pipeline (logging over `reqwest`)
    pub fn new(config: Arc<Config>) -> ApiResult<Self> {
        Self::builder(config).build()
    }

    /// Create a client from a provider, loading configuration on first use
    pub fn from_provider(provider: &ConfigProvider) -> ApiResult<Self> {
        Self::new(provider.get()?)
    }

    /// Start building a client with custom middleware or transport
    #[must_use]
    pub fn builder(config: Arc<Config>) -> ClientBuilder {
        ClientBuilder {
            config,
            middleware: Vec::new(),
            dispatcher: None,
            logging: true,
        }
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fresh request context with base URL, default headers and the pipeline attached
    #[must_use]
    pub fn spec(&self) -> RequestSpec {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            X_REQUEST_ID,
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
        );

        let spec = RequestSpec {
            base_url: self.config.base_url.clone(),
            headers,
            path_params: Vec::new(),
            query_params: Vec::new(),
            body: None,
            pipeline: self.pipeline.clone(),
            invalid: None,
        };
        spec.header(API_KEY_HEADER, &self.config.api_key)
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access pet endpoints
    #[must_use]
    pub fn pets(&self) -> PetApi {
        PetApi::new(self.clone())
    }

    /// Access store/order endpoints
    #[must_use]
    pub fn store(&self) -> StoreApi {
        StoreApi::new(self.clone())
    }

    /// Access user endpoints
    #[must_use]
    pub fn users(&self) -> UserApi {
        UserApi::new(self.clone())
    }
}

/// Builder for [`PetstoreClient`]
pub struct ClientBuilder {
    config: Arc<Config>,
    middleware: Vec<Arc<dyn Middleware>>,
    dispatcher: Option<Arc<dyn Dispatch>>,
    logging: bool,
}

impl ClientBuilder {
    /// Install a middleware
    ///
    /// Middleware run in the order they are added, all of them outside the
    /// logging middleware, which stays closest to the network.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Replace the `reqwest` transport
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatch>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Do not install the logging middleware
    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Validate configuration and assemble the pipeline
    pub fn build(self) -> ApiResult<PetstoreClient> {
        self.config.validate()?;

        let dispatcher: Arc<dyn Dispatch> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(ReqwestDispatcher::new(&self.config)?),
        };

        let mut middleware = self.middleware;
        if self.logging {
            middleware.push(Arc::new(LoggingMiddleware::new()));
        }

        debug!(
            base_url = %self.config.base_url,
            middleware = middleware.len(),
            "Initialized Petstore client"
        );

        Ok(PetstoreClient {
            config: self.config,
            pipeline: Pipeline::new(dispatcher, middleware),
        })
    }
}

/// Per-call request context
///
/// Obtained from [`PetstoreClient::spec`], configured with builder methods and
/// consumed by one of the terminal methods (`get`, `post`, `put`, `delete`,
/// `send`). Never shared between calls.
#[derive(Debug)]
pub struct RequestSpec {
    base_url: String,
    headers: HeaderMap,
    path_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    pipeline: Pipeline,
    invalid: Option<ApiError>,
}

impl RequestSpec {
    /// Set a value for a `{name}` segment of the path
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    /// Append a query string parameter
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((name.into(), value.to_string()));
        self
    }

    /// Set a header, replacing any previous value
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                self.invalid
                    .get_or_insert_with(|| ApiError::InvalidHeader(name.to_string()));
            }
        }
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(e) => {
                self.invalid.get_or_insert(ApiError::Json(e));
            }
        }
        self
    }

    /// Finish the request description without sending it
    pub fn into_request(self, method: Method, path: &str) -> ApiResult<(ApiRequest, Pipeline)> {
        if let Some(e) = self.invalid {
            return Err(e);
        }

        let request = ApiRequest {
            method,
            base_url: self.base_url,
            path: path.to_string(),
            path_params: self.path_params,
            query_params: self.query_params,
            headers: self.headers,
            body: self.body,
        };
        Ok((request, self.pipeline))
    }

    /// Send the request through the pipeline
    pub async fn send(self, method: Method, path: &str) -> ApiResult<ApiResponse> {
        let (request, pipeline) = self.into_request(method, path)?;
        pipeline.execute(request).await
    }

    /// Perform a GET request
    pub async fn get(self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::GET, path).await
    }

    /// Perform a POST request
    pub async fn post(self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::POST, path).await
    }

    /// Perform a PUT request
    pub async fn put(self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::PUT, path).await
    }

    /// Perform a DELETE request
    pub async fn delete(self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::DELETE, path).await
    }
}
