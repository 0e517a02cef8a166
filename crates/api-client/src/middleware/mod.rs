//! Middleware components for request/response processing
//!
//! Every request built by a [`RequestSpec`](crate::client::RequestSpec) passes
//! through an ordered list of [`Middleware`]. Each one receives the request and
//! a [`Next`] continuation for the rest of the chain; the last link is the
//! [`Dispatch`] that performs the network call. The first middleware in the
//! list is the outermost.

mod logging;

pub use logging::LoggingMiddleware;

use crate::error::ApiResult;
use crate::exchange::{ApiRequest, ApiResponse};
use crate::transport::Dispatch;
use async_trait::async_trait;
use std::sync::Arc;

/// Intercepts a request/response pair
///
/// Implementations must be stateless across calls: one instance is shared by
/// every request of a client, possibly concurrently.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handle a request, delegating to `next` for the rest of the chain
    async fn handle(&self, request: ApiRequest, next: Next<'_>) -> ApiResult<ApiResponse>;
}

/// The remainder of a middleware chain
///
/// [`Next::run`] consumes the continuation, so a middleware can forward a
/// request at most once.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    dispatcher: &'a dyn Dispatch,
}

impl<'a> Next<'a> {
    fn new(middleware: &'a [Arc<dyn Middleware>], dispatcher: &'a dyn Dispatch) -> Self {
        Self {
            middleware,
            dispatcher,
        }
    }

    /// Pass the request to the next middleware, or to the network
    pub async fn run(self, request: ApiRequest) -> ApiResult<ApiResponse> {
        match self.middleware.split_first() {
            Some((current, rest)) => {
                current
                    .handle(request, Next::new(rest, self.dispatcher))
                    .await
            }
            None => self.dispatcher.dispatch(request).await,
        }
    }
}

/// An ordered middleware chain bound to a dispatcher
#[derive(Clone)]
pub struct Pipeline {
    middleware: Arc<[Arc<dyn Middleware>]>,
    dispatcher: Arc<dyn Dispatch>,
}

impl Pipeline {
    /// Create a pipeline; `middleware[0]` runs first
    pub fn new(dispatcher: Arc<dyn Dispatch>, middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            middleware: middleware.into(),
            dispatcher,
        }
    }

    /// Run a request through every middleware and dispatch it
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        Next::new(&self.middleware, self.dispatcher.as_ref())
            .run(request)
            .await
    }

    /// Number of installed middleware
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// True when requests go straight to the dispatcher
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}
