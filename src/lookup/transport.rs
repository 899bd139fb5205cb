//! Outbound request construction, optionally through a forward proxy.
//!
//! # Responsibilities
//! - Build the target URL (endpoint + `steamid` + `key`)
//! - Fix timeout and headers for the upstream call
//! - Describe the proxy tunnel when one is requested
//!
//! # Design Decisions
//! - Pure builder: every call returns a fresh, immutable spec
//! - Both proxy kinds are spoken to as HTTP forward proxies; SOCKS5 only
//!   adds the hints that local SOCKS5-to-HTTP adapters expect
//!   (`Proxy-Connection: Keep-Alive` and an HTTP/1.1 floor)

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::lookup::identifier::CleanedIdentifier;

/// Placeholder written instead of the secret key in logged URLs.
const REDACTED: &str = "<redacted>";

/// Proxy protocol requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyKind {
    Socks5,
    Http,
}

impl ProxyKind {
    /// Case-insensitive; anything other than `SOCKS5` is treated as HTTP.
    pub fn from_param(value: &str) -> Self {
        if value.eq_ignore_ascii_case("SOCKS5") {
            ProxyKind::Socks5
        } else {
            ProxyKind::Http
        }
    }
}

/// Per-request proxy settings.
///
/// Serialized under the caller-facing names (`enable`, `server`, `port`, `type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyConfig {
    #[serde(rename = "enable")]
    pub enabled: bool,
    #[serde(rename = "server")]
    pub host: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: ProxyKind,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 1080,
            kind: ProxyKind::Socks5,
        }
    }
}

/// Where and how the request is tunneled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTunnel {
    pub host: String,
    pub port: u16,
    /// Send the absolute URI in the request line.
    pub request_full_uri: bool,
}

impl ProxyTunnel {
    /// `tcp://host:port`
    pub fn descriptor(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }

    /// URL handed to the HTTP client's proxy setting.
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Immutable description of one upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamRequestSpec {
    pub url: Url,
    pub timeout: Duration,
    pub headers: HeaderMap,
    /// Restrict the connection to HTTP/1.1.
    pub http1_only: bool,
    pub tunnel: Option<ProxyTunnel>,
    /// Proxy settings as the caller supplied them.
    pub proxy: ProxyConfig,
}

impl UpstreamRequestSpec {
    /// Target URL with the secret key masked, for logs.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "key" { REDACTED.to_string() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

/// Builds [`UpstreamRequestSpec`]s for the fixed upstream endpoint.
#[derive(Debug, Clone)]
pub struct ProxyAwareTransport {
    endpoint: Url,
    timeout: Duration,
    user_agent: HeaderValue,
}

impl ProxyAwareTransport {
    pub fn new(endpoint: Url, timeout: Duration, user_agent: HeaderValue) -> Self {
        Self {
            endpoint,
            timeout,
            user_agent,
        }
    }

    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let endpoint = Url::parse(&config.upstream.endpoint).map_err(|e| {
            RelayError::Unexpected(format!(
                "invalid upstream endpoint '{}': {}",
                config.upstream.endpoint, e
            ))
        })?;
        let user_agent = HeaderValue::from_str(&format!(
            "{}/{}",
            config.upstream.user_agent_product, config.release.version
        ))
        .map_err(|e| RelayError::Unexpected(format!("invalid User-Agent: {}", e)))?;

        Ok(Self::new(
            endpoint,
            Duration::from_secs(config.upstream.timeout_secs),
            user_agent,
        ))
    }

    /// Describe the upstream call for `id`.
    pub fn build_request_spec(
        &self,
        id: &CleanedIdentifier,
        secret_key: &str,
        proxy: &ProxyConfig,
    ) -> UpstreamRequestSpec {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("steamid", id.as_str())
            .append_pair("key", secret_key);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut http1_only = false;
        let mut tunnel = None;

        if proxy.enabled {
            tunnel = Some(ProxyTunnel {
                host: proxy.host.clone(),
                port: proxy.port,
                request_full_uri: true,
            });

            if proxy.kind == ProxyKind::Socks5 {
                http1_only = true;
                headers.insert(
                    HeaderName::from_static("proxy-connection"),
                    HeaderValue::from_static("Keep-Alive"),
                );
            }
        }

        UpstreamRequestSpec {
            url,
            timeout: self.timeout,
            headers,
            http1_only,
            tunnel,
            proxy: proxy.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::identifier::IdentifierValidator;
    use crate::observability::DiagnosticLogger;

    fn transport() -> ProxyAwareTransport {
        ProxyAwareTransport::from_config(&RelayConfig::default()).unwrap()
    }

    fn id() -> CleanedIdentifier {
        let logger = DiagnosticLogger::disabled();
        IdentifierValidator::new(&logger)
            .validate("76561198000000000")
            .unwrap()
    }

    #[test]
    fn test_direct_request_spec() {
        let spec = transport().build_request_spec(&id(), "s3cret", &ProxyConfig::default());

        assert_eq!(
            spec.url.as_str(),
            "https://api.uapis.cn/api/v1/game/steam/summary?steamid=76561198000000000&key=s3cret"
        );
        assert_eq!(spec.timeout, Duration::from_secs(30));
        assert_eq!(spec.headers[USER_AGENT], "SteamQueryTool/5.0.0");
        assert_eq!(spec.headers[ACCEPT], "application/json");
        assert_eq!(spec.headers[CONTENT_TYPE], "application/json");
        assert!(spec.headers.get("proxy-connection").is_none());
        assert!(!spec.http1_only);
        assert!(spec.tunnel.is_none());
    }

    #[test]
    fn test_socks5_proxy_adds_hints() {
        let proxy = ProxyConfig {
            enabled: true,
            ..ProxyConfig::default()
        };
        let spec = transport().build_request_spec(&id(), "k", &proxy);

        let tunnel = spec.tunnel.unwrap();
        assert_eq!(tunnel.descriptor(), "tcp://127.0.0.1:1080");
        assert!(tunnel.request_full_uri);
        assert!(spec.http1_only);
        assert_eq!(spec.headers["proxy-connection"], "Keep-Alive");
    }

    #[test]
    fn test_http_proxy_has_no_socks_hints() {
        let proxy = ProxyConfig {
            enabled: true,
            host: "10.0.0.2".to_string(),
            port: 3128,
            kind: ProxyKind::Http,
        };
        let spec = transport().build_request_spec(&id(), "k", &proxy);

        let tunnel = spec.tunnel.unwrap();
        assert_eq!(tunnel.descriptor(), "tcp://10.0.0.2:3128");
        assert_eq!(tunnel.proxy_url(), "http://10.0.0.2:3128");
        assert!(!spec.http1_only);
        assert!(spec.headers.get("proxy-connection").is_none());
    }

    #[test]
    fn test_disabled_proxy_is_ignored() {
        let proxy = ProxyConfig {
            enabled: false,
            kind: ProxyKind::Socks5,
            ..ProxyConfig::default()
        };
        let spec = transport().build_request_spec(&id(), "k", &proxy);
        assert!(spec.tunnel.is_none());
        assert!(!spec.http1_only);
    }

    #[test]
    fn test_redacted_url_masks_key() {
        let spec = transport().build_request_spec(&id(), "s3cret", &ProxyConfig::default());
        let redacted = spec.redacted_url();
        assert!(!redacted.contains("s3cret"));
        assert!(redacted.contains("steamid=76561198000000000"));
        assert!(redacted.contains("key=%3Credacted%3E"));
    }

    #[test]
    fn test_proxy_config_wire_names() {
        let value = serde_json::to_value(ProxyConfig::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "enable": false,
                "server": "127.0.0.1",
                "port": 1080,
                "type": "SOCKS5"
            })
        );
    }

    #[test]
    fn test_proxy_kind_from_param() {
        assert_eq!(ProxyKind::from_param("socks5"), ProxyKind::Socks5);
        assert_eq!(ProxyKind::from_param("SOCKS5"), ProxyKind::Socks5);
        assert_eq!(ProxyKind::from_param("HTTP"), ProxyKind::Http);
        assert_eq!(ProxyKind::from_param("anything"), ProxyKind::Http);
    }
}
