//! Request and response values passed through the middleware chain

use crate::error::{ApiError, ApiResult};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Fully described outbound request
///
/// Built fresh for every call by [`RequestSpec`](crate::client::RequestSpec) and
/// handed by value down the middleware chain.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Base URL of the service, e.g. `https://petstore.swagger.io/v2`
    pub base_url: String,
    /// Path template relative to the base URL, e.g. `/pet/{petId}`
    pub path: String,
    /// Values substituted for `{name}` segments of the path
    pub path_params: Vec<(String, String)>,
    /// Query string parameters, in insertion order
    pub query_params: Vec<(String, String)>,
    /// Request headers
    pub headers: HeaderMap,
    /// JSON body, if any
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request without parameters, headers or body
    pub fn new(method: Method, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: path.into(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Resolve the absolute URL with path parameters substituted and query appended
    pub fn url(&self) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?;
            segments.pop_if_empty();
            for segment in self.path.split('/').filter(|s| !s.is_empty()) {
                segments.push(&self.resolve_segment(segment)?);
            }
        }

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Full URI for display, falling back to the unresolved template
    #[must_use]
    pub fn uri(&self) -> String {
        self.url().map_or_else(
            |_| format!("{}{}", self.base_url.trim_end_matches('/'), self.path),
            String::from,
        )
    }

    fn resolve_segment(&self, segment: &str) -> ApiResult<String> {
        let Some(name) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        else {
            return Ok(segment.to_string());
        };

        self.path_params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ApiError::InvalidUrl(format!("unresolved path parameter {{{name}}}")))
    }
}

/// Response as received from the service
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Create a response without headers
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Numeric status code
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status is 400 or above
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.as_u16() >= 400
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into [`ApiError::UnexpectedStatus`]
    pub fn error_for_status(self) -> ApiResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::unexpected_status(self.status_code(), self.text()))
        }
    }
}
