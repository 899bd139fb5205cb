//! Inbound query parameters.
//!
//! # Responsibilities
//! - Pick the relay's parameters out of the query string
//! - Apply defaults to the proxy settings
//!
//! # Design Decisions
//! - Parameters are kept as a plain map for logging; typed access goes
//!   through [`LookupQuery`]
//! - `proxy_port` is coerced like an integer cast: leading digits, else 0

use std::collections::HashMap;

use crate::lookup::{ProxyConfig, ProxyKind};

/// The query parameters the relay understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupQuery {
    pub steamid: Option<String>,
    pub version: Option<String>,
    pub proxy_enable: Option<String>,
    pub proxy_server: Option<String>,
    pub proxy_port: Option<String>,
    pub proxy_type: Option<String>,
}

impl LookupQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).cloned();
        Self {
            steamid: get("steamid"),
            version: get("version"),
            proxy_enable: get("proxy_enable"),
            proxy_server: get("proxy_server"),
            proxy_port: get("proxy_port"),
            proxy_type: get("proxy_type"),
        }
    }

    /// `version` present with any value, even empty.
    pub fn wants_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn proxy_config(&self) -> ProxyConfig {
        let defaults = ProxyConfig::default();
        ProxyConfig {
            enabled: self.proxy_enable.as_deref() == Some("true"),
            host: self.proxy_server.clone().unwrap_or(defaults.host),
            port: self
                .proxy_port
                .as_deref()
                .map(coerce_port)
                .unwrap_or(defaults.port),
            kind: self
                .proxy_type
                .as_deref()
                .map(ProxyKind::from_param)
                .unwrap_or(defaults.kind),
        }
    }
}

/// Leading decimal digits after optional whitespace; anything else,
/// or a value beyond the port range, is 0.
fn coerce_port(value: &str) -> u16 {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}
