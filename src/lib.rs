//! Steam profile relay library.
//!
//! Accepts a SteamID64 over HTTP, validates it, forwards a single lookup to
//! the configured upstream API (optionally through a forward proxy) and
//! answers with a normalized profile or a uniform JSON error envelope.

pub mod config;
pub mod error;
pub mod http;
pub mod lookup;
pub mod observability;

pub use config::RelayConfig;
pub use error::{ErrorEnvelope, RelayError};
pub use http::HttpServer;
pub use lookup::{NormalizedProfile, ProxyConfig, ProxyKind, RequestPipeline};
