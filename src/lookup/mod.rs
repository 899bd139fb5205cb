//! Profile lookup subsystem.
//!
//! # Data Flow
//! ```text
//! raw steamid
//!     → identifier.rs (clean to digits, require 17)
//!     → transport.rs (URL, headers, timeout, optional proxy tunnel)
//!     → client.rs (single GET, classify response)
//!     → normalizer.rs (stable profile schema with defaults)
//!     → pipeline.rs (orchestration, uniform error envelope)
//! ```

pub mod client;
pub mod identifier;
pub mod normalizer;
pub mod pipeline;
pub mod transport;

pub use client::{classify_body, UpstreamClient, UpstreamOutcome};
pub use identifier::{CleanedIdentifier, IdentifierValidator, ValidationFailure};
pub use normalizer::{NormalizedProfile, PersonaState, ResponseNormalizer};
pub use pipeline::RequestPipeline;
pub use transport::{ProxyAwareTransport, ProxyConfig, ProxyKind, UpstreamRequestSpec};
