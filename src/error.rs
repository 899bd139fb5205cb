//! Relay error taxonomy and the uniform JSON error envelope.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Every way a lookup can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelayError {
    /// The identifier does not clean to 17 digits.
    #[error("invalid SteamID format")]
    Validation { cleaned: String, cleaned_length: usize },

    /// No response could be obtained from upstream.
    #[error("API request failed, no response received")]
    Transport { detail: String },

    /// Upstream answered with an HTML document instead of JSON.
    #[error("API returned HTML content, access may be blocked or the API service is failing")]
    Blocked,

    /// Upstream body is not a JSON object.
    #[error("JSON parse failed: {detail}")]
    MalformedResponse { detail: String },

    /// Upstream reported a non-200 application code.
    #[error("{message}")]
    UpstreamApplication { code: Value, message: String },

    #[error("only GET requests are supported")]
    UnsupportedMethod { method: String },

    #[error("missing {0} parameter")]
    MissingParameter(&'static str),

    /// Anything not covered above.
    #[error("request exception: {0}")]
    Unexpected(String),
}

impl RelayError {
    /// HTTP status carried alongside the envelope.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation { .. } | RelayError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            RelayError::UnsupportedMethod { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Transport { .. }
            | RelayError::Blocked
            | RelayError::MalformedResponse { .. }
            | RelayError::UpstreamApplication { .. } => StatusCode::BAD_GATEWAY,
            RelayError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation { .. } => "validation",
            RelayError::Transport { .. } => "transport",
            RelayError::Blocked => "blocked",
            RelayError::MalformedResponse { .. } => "malformed",
            RelayError::UpstreamApplication { .. } => "application",
            RelayError::UnsupportedMethod { .. } => "unsupported_method",
            RelayError::MissingParameter(_) => "missing_parameter",
            RelayError::Unexpected(_) => "unexpected",
        }
    }

    /// Convert into the wire envelope.
    pub fn into_envelope(self) -> ErrorEnvelope {
        let error = self.to_string();
        match self {
            RelayError::Validation {
                cleaned,
                cleaned_length,
            } => ErrorEnvelope {
                error,
                debug: Some(format!(
                    "cleaned length is {}, 17 digits required",
                    cleaned_length
                )),
                cleaned_input: Some(cleaned),
                version: None,
            },
            RelayError::Transport { detail } => ErrorEnvelope::new(error).with_debug(detail),
            RelayError::Blocked => ErrorEnvelope::new(error)
                .with_debug("HTML response detected, check the API key and network settings"),
            RelayError::MalformedResponse { .. } => ErrorEnvelope::new(error)
                .with_debug("API returned invalid JSON, check the API service status"),
            _ => ErrorEnvelope::new(error),
        }
    }
}

/// Failure body returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            debug: None,
            cleaned_input: None,
            version: None,
        }
    }

    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl From<RelayError> for ErrorEnvelope {
    fn from(err: RelayError) -> Self {
        err.into_envelope()
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_envelope() {
        let envelope = RelayError::Validation {
            cleaned: "123".to_string(),
            cleaned_length: 3,
        }
        .into_envelope();

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "error": "invalid SteamID format",
                "debug": "cleaned length is 3, 17 digits required",
                "cleaned_input": "123"
            })
        );
    }

    #[test]
    fn test_application_error_uses_upstream_message() {
        let err = RelayError::UpstreamApplication {
            code: json!(403),
            message: "forbidden".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            serde_json::to_value(err.into_envelope()).unwrap(),
            json!({"error": "forbidden"})
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            RelayError::MissingParameter("steamid").to_string(),
            "missing steamid parameter"
        );
        assert_eq!(
            RelayError::Unexpected("boom".to_string()).to_string(),
            "request exception: boom"
        );
        assert_eq!(
            RelayError::MalformedResponse {
                detail: "expected value at line 1 column 1".to_string()
            }
            .to_string(),
            "JSON parse failed: expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_envelope_with_version() {
        let envelope = ErrorEnvelope::new("only GET requests are supported").with_version("5.0.0");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"error": "only GET requests are supported", "version": "5.0.0"})
        );
    }
}
