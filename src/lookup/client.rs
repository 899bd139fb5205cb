//! Upstream HTTP client and response classification.
//!
//! # Responsibilities
//! - Issue the single GET described by an [`UpstreamRequestSpec`]
//! - Trace the request and the full raw response to the diagnostic log
//! - Classify the body into exactly one [`UpstreamOutcome`]
//!
//! # Classification Order
//! ```text
//! no response            → TransportError
//! HTML marker in body    → BlockedOrHtmlResponse
//! not a JSON object      → MalformedJson
//! code present, != 200   → ApplicationError
//! otherwise              → Success
//! ```
//!
//! One attempt per call. Nothing is retried.

use reqwest::{Client, Proxy};
use serde_json::{json, Map, Value};

use crate::lookup::transport::UpstreamRequestSpec;
use crate::observability::DiagnosticLogger;

/// Substrings that mark an HTML document (case-sensitive).
const HTML_MARKERS: [&str; 2] = ["<!DOCTYPE html", "<html"];

/// Message used when an application error carries none.
pub const DEFAULT_APPLICATION_MESSAGE: &str = "query failed: unknown error";

/// Result of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// No usable response was obtained.
    TransportError { detail: String },
    /// An HTML page came back, likely a captive portal, WAF or misconfigured proxy.
    BlockedOrHtmlResponse,
    MalformedJson { detail: String, body: String },
    ApplicationError { code: Value, message: String },
    Success { payload: Map<String, Value> },
}

impl UpstreamOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpstreamOutcome::Success { .. })
    }
}

/// Classify a raw response body.
///
/// HTML detection is a plain substring check anywhere in the body, so it
/// wins even over otherwise valid JSON.
pub fn classify_body(body: &str) -> UpstreamOutcome {
    if HTML_MARKERS.iter().any(|marker| body.contains(marker)) {
        return UpstreamOutcome::BlockedOrHtmlResponse;
    }

    let payload = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return UpstreamOutcome::MalformedJson {
                detail: format!("expected a JSON object, found {}", json_type(&other)),
                body: body.to_string(),
            }
        }
        Err(e) => {
            return UpstreamOutcome::MalformedJson {
                detail: e.to_string(),
                body: body.to_string(),
            }
        }
    };

    match payload.get("code") {
        Some(code) if !code.is_null() && code.as_i64() != Some(200) => {
            let message = match payload.get("message") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => DEFAULT_APPLICATION_MESSAGE.to_string(),
                Some(other) => other.to_string(),
            };
            UpstreamOutcome::ApplicationError {
                code: code.clone(),
                message,
            }
        }
        _ => UpstreamOutcome::Success { payload },
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Performs upstream lookups, tracing each one.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamClient<'a> {
    logger: &'a DiagnosticLogger,
}

impl<'a> UpstreamClient<'a> {
    pub fn new(logger: &'a DiagnosticLogger) -> Self {
        Self { logger }
    }

    /// Issue the request and classify the response.
    pub async fn fetch(&self, spec: &UpstreamRequestSpec) -> UpstreamOutcome {
        self.logger.log_data(
            "sending API request",
            &json!({
                "url": spec.redacted_url(),
                "proxy": spec.proxy,
                "tunnel": spec.tunnel.as_ref().map(|t| json!({
                    "descriptor": t.descriptor(),
                    "request_full_uri": t.request_full_uri,
                    "http1_only": spec.http1_only,
                })),
            }),
        );

        let client = match build_client(spec) {
            Ok(client) => client,
            Err(e) => return self.transport_failure(format!("client setup failed: {}", e)),
        };

        let response = match client
            .get(spec.url.clone())
            .headers(spec.headers.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return self.transport_failure(e.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(format!("failed to read body: {}", e)),
        };

        self.logger.log_data(
            "API raw response",
            &json!({
                "length": body.len(),
                "status": status.as_u16(),
                "response": body,
            }),
        );

        if !status.is_success() {
            tracing::warn!(status = %status, "Upstream returned non-success status");
            return UpstreamOutcome::TransportError {
                detail: format!("upstream returned HTTP {}", status),
            };
        }

        classify_body(&body)
    }

    fn transport_failure(&self, detail: String) -> UpstreamOutcome {
        tracing::warn!(error = %detail, "Upstream request failed");
        self.logger.log_data(
            "API raw response",
            &json!({ "length": 0, "response": null, "error": detail }),
        );
        UpstreamOutcome::TransportError { detail }
    }
}

fn build_client(spec: &UpstreamRequestSpec) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().timeout(spec.timeout);

    builder = match &spec.tunnel {
        Some(tunnel) => builder.proxy(Proxy::all(tunnel.proxy_url())?),
        None => builder.no_proxy(),
    };

    if spec.http1_only {
        builder = builder.http1_only();
    }

    builder.build()
}
