//! Network dispatch at the innermost end of the middleware chain

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::exchange::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Sends a request over the wire and returns whatever the service answered
///
/// Any status code is a successful dispatch; only transport failures are errors.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Perform the network call
    async fn dispatch(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// [`Dispatch`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestDispatcher {
    inner: Client,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl ReqwestDispatcher {
    /// Build a client bounded by the configured connection and response timeouts
    pub fn new(config: &Config) -> ApiResult<Self> {
        let inner = Client::builder()
            .connect_timeout(config.connection_timeout)
            .timeout(config.response_timeout)
            .user_agent(concat!("petstore-api-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            connect_timeout: config.connection_timeout,
            response_timeout: config.response_timeout,
        })
    }

    /// Report which of the two limits expired
    fn map_error(&self, error: reqwest::Error) -> ApiError {
        match (error.is_timeout(), error.is_connect()) {
            (true, true) => ApiError::Timeout(self.connect_timeout),
            (true, false) => ApiError::Timeout(self.response_timeout),
            _ => ApiError::Request(error),
        }
    }
}

#[async_trait]
impl Dispatch for ReqwestDispatcher {
    async fn dispatch(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = request.url()?;
        let mut builder = self
            .inner
            .request(request.method, url)
            .headers(request.headers);

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(ApiResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
