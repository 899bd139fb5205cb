//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream lookup API.
    pub upstream: UpstreamConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Append-only diagnostic log.
    pub diagnostics: DiagnosticsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Release metadata served by the `version` query.
    pub release: ReleaseConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Lookup endpoint; the identifier and key are appended as query parameters.
    pub endpoint: String,

    /// Secret key sent as the `key` query parameter.
    /// Overridden by `STEAM_RELAY_API_KEY` at startup.
    pub api_key: String,

    /// Total time allowed for one upstream call, in seconds.
    pub timeout_secs: u64,

    /// Product token of the outbound `User-Agent` (`<product>/<version>`).
    pub user_agent_product: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.uapis.cn/api/v1/game/steam/summary".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            user_agent_product: "SteamQueryTool".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        // Longer than the upstream timeout so upstream failures surface as envelopes.
        Self { request_secs: 35 }
    }
}

/// Diagnostic log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Write diagnostic events to `log_path`. When false, events only reach tracing.
    pub enabled: bool,

    /// Append-only log file.
    pub log_path: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: "steam_api_detailed_log.txt".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Release metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Version tag stamped on every profile and sent in the `User-Agent`.
    pub version: String,
    pub build_date: String,
    /// Human-readable description of the accepted identifier format.
    pub support: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version: "5.0.0".to_string(),
            build_date: "2025-08-09".to_string(),
            support: "SteamID64 (17 digits)".to_string(),
        }
    }
}
