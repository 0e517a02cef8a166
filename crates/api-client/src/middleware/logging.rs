//! Request/response logging
//!
//! Observational only: the request is forwarded untouched and the response (or
//! error) from the rest of the chain is returned as-is. Secrets are masked in
//! the log output, never in what is sent.

use super::{Middleware, Next};
use crate::error::ApiResult;
use crate::exchange::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, error, info};

/// Headers whose values are masked in log output
const API_KEY_HEADER: &str = "api_key";

/// Query parameters and JSON fields whose values are hidden in log output
const SENSITIVE_FIELDS: &[&str] = &["password", "api_key"];

/// Replacement for hidden values
const REDACTED: &str = "********";

/// Logs every exchange through `tracing`
///
/// - before dispatch: method and URI at `info`, headers at `debug`, body at `info`
/// - status >= 400: a single `error` record with status and body
/// - status < 400: status at `info`, body at `debug`
/// - transport failure: a single `error` record
///
/// `password` and `api_key` values are hidden wherever they appear in the
/// query string or in JSON bodies.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    sensitive_headers: Vec<HeaderName>,
    sensitive_fields: Vec<String>,
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingMiddleware {
    /// Create a logger that masks the `api_key` and `Authorization` headers
    #[must_use]
    pub fn new() -> Self {
        Self {
            sensitive_headers: vec![HeaderName::from_static(API_KEY_HEADER), AUTHORIZATION],
            sensitive_fields: SENSITIVE_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Also mask the value of `header` in log output
    #[must_use]
    pub fn with_sensitive_header(mut self, header: HeaderName) -> Self {
        self.sensitive_headers.push(header);
        self
    }

    /// Also hide query parameter or JSON field `name` in log output
    #[must_use]
    pub fn with_sensitive_field(mut self, name: impl Into<String>) -> Self {
        self.sensitive_fields.push(name.into());
        self
    }

    fn is_sensitive_field(&self, name: &str) -> bool {
        self.sensitive_fields
            .iter()
            .any(|field| field.eq_ignore_ascii_case(name))
    }

    /// Resolved URI with sensitive query values hidden
    fn display_uri(&self, request: &ApiRequest) -> String {
        if !request.query_params.iter().any(|(key, _)| self.is_sensitive_field(key)) {
            return request.uri();
        }

        let mut shown = ApiRequest::new(
            request.method.clone(),
            request.base_url.clone(),
            request.path.clone(),
        );
        shown.path_params.clone_from(&request.path_params);
        shown.query_params = request
            .query_params
            .iter()
            .map(|(key, value)| {
                let value = if self.is_sensitive_field(key) {
                    REDACTED.to_string()
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect();
        shown.uri()
    }

    fn redact(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| {
                        let value = if self.is_sensitive_field(key) && !value.is_null() {
                            Value::String(REDACTED.to_string())
                        } else {
                            self.redact(value)
                        };
                        (key.clone(), value)
                    })
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.redact(item)).collect())
            }
            other => other.clone(),
        }
    }

    /// Response text with sensitive JSON fields hidden; non-JSON passes through
    fn render_body(&self, text: String) -> String {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => self.redact(&value).to_string(),
            Err(_) => text,
        }
    }

    fn render_headers(&self, headers: &HeaderMap) -> String {
        headers
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().unwrap_or("<binary>");
                if self.sensitive_headers.contains(name) {
                    format!("{name}: {}", mask_secret(value))
                } else {
                    format!("{name}: {value}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn log_request(&self, request: &ApiRequest, uri: &str) {
        info!(method = %request.method, uri = %uri, "Sending request");

        if !request.headers.is_empty() {
            debug!(headers = %self.render_headers(&request.headers), "Request headers");
        }

        if let Some(ref body) = request.body {
            info!(body = %self.redact(body), "Request body");
        }
    }

    fn log_outcome(&self, method: &str, uri: &str, outcome: &ApiResult<ApiResponse>) {
        match outcome {
            Ok(response) if response.is_error() => {
                error!(
                    method = %method,
                    uri = %uri,
                    status = response.status_code(),
                    body = %self.render_body(response.text()),
                    "Request failed"
                );
            }
            Ok(response) => {
                info!(
                    method = %method,
                    uri = %uri,
                    status = response.status_code(),
                    "Response received"
                );
                debug!(body = %self.render_body(response.text()), "Response body");
            }
            Err(e) => {
                error!(method = %method, uri = %uri, error = %e, "Request did not complete");
            }
        }
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(&self, request: ApiRequest, next: Next<'_>) -> ApiResult<ApiResponse> {
        let method = request.method.to_string();
        let uri = self.display_uri(&request);
        self.log_request(&request, &uri);

        let outcome = next.run(request).await;

        self.log_outcome(&method, &uri, &outcome);
        outcome
    }
}

/// Mask a secret for display (show first/last few chars)
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 8 {
        "*".repeat(secret.len())
    } else {
        format!("{}...{}", &secret[..4], &secret[secret.len() - 4..])
    }
}
