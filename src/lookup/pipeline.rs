//! Lookup orchestration.
//!
//! ```text
//! Validating ──fail──▶ Done(validation error)
//!     │
//! BuildingRequest → Fetching ──transport/blocked/malformed/application──▶ Done(error)
//!     │
//! Normalizing → Done(profile)
//! ```
//!
//! Every failure is written to the diagnostic log before it is returned.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::config::RelayConfig;
use crate::error::{ErrorEnvelope, RelayError, RelayResult};
use crate::lookup::client::{UpstreamClient, UpstreamOutcome};
use crate::lookup::identifier::IdentifierValidator;
use crate::lookup::normalizer::{NormalizedProfile, ResponseNormalizer};
use crate::lookup::transport::{ProxyAwareTransport, ProxyConfig};
use crate::observability::{metrics, DiagnosticLogger};

/// Validator → transport → client → normalizer, composed.
#[derive(Debug)]
pub struct RequestPipeline {
    logger: Arc<DiagnosticLogger>,
    transport: ProxyAwareTransport,
    normalizer: ResponseNormalizer,
    secret_key: String,
}

impl RequestPipeline {
    /// Build the pipeline from a validated configuration.
    pub fn new(config: &RelayConfig, logger: Arc<DiagnosticLogger>) -> RelayResult<Self> {
        Ok(Self {
            logger,
            transport: ProxyAwareTransport::from_config(config)?,
            normalizer: ResponseNormalizer::new(config.release.version.clone()),
            secret_key: config.upstream.api_key.clone(),
        })
    }

    pub fn logger(&self) -> &DiagnosticLogger {
        &self.logger
    }

    /// Look up `raw_id` and map any failure to an [`ErrorEnvelope`].
    pub async fn handle(
        &self,
        raw_id: &str,
        proxy: &ProxyConfig,
    ) -> Result<NormalizedProfile, ErrorEnvelope> {
        self.lookup(raw_id, proxy)
            .await
            .map_err(RelayError::into_envelope)
    }

    /// Same as [`RequestPipeline::handle`] but keeps the typed error.
    pub async fn lookup(&self, raw_id: &str, proxy: &ProxyConfig) -> RelayResult<NormalizedProfile> {
        let start = Instant::now();
        let result = self.run_stages(raw_id, proxy).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_lookup(outcome, start);
        result
    }

    async fn run_stages(&self, raw_id: &str, proxy: &ProxyConfig) -> RelayResult<NormalizedProfile> {
        let id = match IdentifierValidator::new(&self.logger).validate(raw_id) {
            Ok(id) => id,
            Err(failure) => {
                let err = RelayError::from(failure.clone());
                self.logger.log_data(
                    &format!("input validation failed: {}", err),
                    &json!({
                        "error": err.to_string(),
                        "cleaned": failure.cleaned,
                        "cleaned_length": failure.cleaned_length,
                        "original_length": failure.original_length,
                    }),
                );
                return Err(err);
            }
        };

        let spec = self
            .transport
            .build_request_spec(&id, &self.secret_key, proxy);

        tracing::debug!(steamid = %id, proxied = spec.tunnel.is_some(), "Fetching profile");

        let payload = match UpstreamClient::new(&self.logger).fetch(&spec).await {
            UpstreamOutcome::Success { payload } => payload,
            UpstreamOutcome::TransportError { detail } => {
                let err = RelayError::Transport { detail };
                self.logger.log(&format!("request failed: {}", err));
                return Err(err);
            }
            UpstreamOutcome::BlockedOrHtmlResponse => {
                let err = RelayError::Blocked;
                self.logger.log(&format!("response format error: {}", err));
                return Err(err);
            }
            UpstreamOutcome::MalformedJson { detail, body } => {
                let err = RelayError::MalformedResponse { detail };
                self.logger.log_data(
                    &format!("parse error: {}", err),
                    &json!({ "response": body }),
                );
                return Err(err);
            }
            UpstreamOutcome::ApplicationError { code, message } => {
                self.logger.log_data(
                    "API error response",
                    &json!({ "code": code, "message": message }),
                );
                return Err(RelayError::UpstreamApplication { code, message });
            }
        };

        Ok(self.normalizer.normalize(&payload))
    }
}
