//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, front-door checks)
//!     → request.rs (query parameters, proxy defaults)
//!     → [lookup pipeline]
//!     → response.rs (JSON body, status code)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::LookupQuery;
pub use response::VersionInfo;
pub use server::{AppState, HttpServer};
