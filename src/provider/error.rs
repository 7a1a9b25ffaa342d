//! Provider error types.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Failed to convert parameters for tool {tool}: {source}")]
    RequestBuild {
        tool: String,
        #[source]
        source: SchemaError,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// Classify a transient failure, returning its category if a retry could help.
    ///
    /// This client never retries on its own; callers build their resilience
    /// layer on top of this.
    pub fn retryable_category(&self) -> Option<&'static str> {
        match self {
            Self::Api(e) if e.status == 429 => Some("Rate limited"),
            Self::Api(e) if e.status >= 500 => Some("Server error"),
            Self::Transport(e) if e.is_timeout() => Some("Request timed out"),
            Self::Transport(TransportError::Request(_) | TransportError::Read(_)) => {
                Some("Network error")
            }
            _ => None,
        }
    }
}

/// Error returned by the provider with a non-success status.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: u16,
    /// Message from the error envelope, empty when the body had none.
    pub message: String,
    pub error_type: Option<String>,
    pub code: Option<String>,
    /// Seconds from a `Retry-After` header.
    pub retry_after: Option<u64>,
    /// Raw response body.
    pub body: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "API error {}: {}", self.status, self.body)
        } else {
            write!(f, "API error {}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Build from a response body, using the `{"error": {...}}` envelope if present.
    pub fn from_body(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .map(|e| e.error)
            .filter(|e| !e.message.is_empty());

        match envelope {
            Some(err) => Self {
                status,
                message: err.message,
                error_type: err.error_type.filter(|t| !t.is_empty()),
                code: err.code.and_then(code_to_string),
                retry_after: None,
                body,
            },
            None => Self {
                status,
                message: String::new(),
                error_type: None,
                code: None,
                retry_after: None,
                body,
            },
        }
    }

    #[must_use]
    pub fn with_retry_after(mut self, retry_after: Option<u64>) -> Self {
        self.retry_after = retry_after;
        self
    }
}

/// `{"error": {"message": ..., "type": ..., "code": ...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, deserialize_with = "crate::provider::openai_compat::null_as_default")]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Providers send this as a string, a number, or null.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

fn code_to_string(code: serde_json::Value) -> Option<String> {
    match code {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Failure before or while receiving a response, where no usable HTTP reply exists.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("SSE line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request(e) | Self::Read(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Failure converting a tool parameter schema.
///
/// Nested failures are wrapped with the property name or `array items` they
/// occurred under, so the display reads like a path.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to convert property {name}: {source}")]
    Property {
        name: String,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("failed to convert array items: {source}")]
    Items {
        #[source]
        source: Box<SchemaError>,
    },

    #[error("invalid schema: {0}")]
    Invalid(String),

    #[error("schema nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

impl SchemaError {
    pub(crate) fn in_property(name: &str, source: SchemaError) -> Self {
        Self::Property {
            name: name.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn in_items(source: SchemaError) -> Self {
        Self::Items {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_envelope() {
        let err = ApiError::from_body(
            401,
            r#"{"error":{"message":"invalid api key","type":"auth_error"}}"#,
        );
        assert_eq!(err.status, 401);
        assert_eq!(err.message, "invalid api key");
        assert_eq!(err.error_type.as_deref(), Some("auth_error"));
        assert!(err.code.is_none());
        assert_eq!(err.to_string(), "API error 401: invalid api key");
    }

    #[test]
    fn test_api_error_numeric_code() {
        let err = ApiError::from_body(
            429,
            r#"{"error":{"message":"Rate limit exceeded","type":"rate_limit_error","code":1302}}"#,
        );
        assert_eq!(err.code.as_deref(), Some("1302"));
    }

    #[test]
    fn test_api_error_raw_body() {
        let err = ApiError::from_body(502, "<html>Bad Gateway</html>");
        assert!(err.message.is_empty());
        assert!(err.error_type.is_none());
        assert_eq!(err.body, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "API error 502: <html>Bad Gateway</html>");
    }

    #[test]
    fn test_api_error_envelope_without_message() {
        let err = ApiError::from_body(400, r#"{"error":{"type":"invalid_request_error"}}"#);
        assert!(err.message.is_empty());
        assert!(err.error_type.is_none());
    }

    #[test]
    fn test_schema_error_path() {
        let err = SchemaError::in_property(
            "filters",
            SchemaError::in_items(SchemaError::Invalid("`enum` must be an array".into())),
        );
        assert_eq!(
            err.to_string(),
            "failed to convert property filters: failed to convert array items: invalid schema: `enum` must be an array"
        );
    }

    #[test]
    fn test_retryable_category() {
        let rate_limited = Error::Api(ApiError::from_body(429, ""));
        assert_eq!(rate_limited.retryable_category(), Some("Rate limited"));

        let server = Error::Api(ApiError::from_body(503, ""));
        assert_eq!(server.retryable_category(), Some("Server error"));

        let auth = Error::Api(ApiError::from_body(401, ""));
        assert_eq!(auth.retryable_category(), None);

        let cancelled = Error::Transport(TransportError::Cancelled);
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.retryable_category(), None);

        assert_eq!(Error::Config("x".into()).retryable_category(), None);
    }
}
