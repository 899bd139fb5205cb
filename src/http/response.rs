//! Response bodies.
//!
//! # Responsibilities
//! - Serialize profiles, envelopes and version info as UTF-8 JSON
//! - Map relay errors to HTTP status codes
//! - Allow any origin on every JSON response

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::config::ReleaseConfig;
use crate::error::{ErrorEnvelope, RelayError};

/// `Content-Type` of every relay response.
pub const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Body of a `version` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub build_date: String,
    pub support: String,
}

impl From<&ReleaseConfig> for VersionInfo {
    fn from(release: &ReleaseConfig) -> Self {
        Self {
            version: release.version.clone(),
            build_date: release.build_date.clone(),
            support: release.support.clone(),
        }
    }
}

/// Serialize `body` with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            (StatusCode::INTERNAL_SERVER_ERROR, "response serialization failed").into_response()
        }
    }
}

/// Envelope response with the status belonging to `err`.
pub fn error_response(err: RelayError, version: Option<&str>) -> Response {
    let status = err.status_code();
    let mut envelope = err.into_envelope();
    if let Some(version) = version {
        envelope = envelope.with_version(version);
    }
    json_response(status, &envelope)
}

/// Envelope response when only the envelope is at hand.
pub fn envelope_response(status: StatusCode, envelope: &ErrorEnvelope) -> Response {
    json_response(status, envelope)
}
