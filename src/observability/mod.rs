//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages produce:
//!     → diagnostics.rs (append-only diagnostic events, mirrored to tracing)
//!     → logging.rs (process-wide tracing subscriber)
//!     → metrics.rs (lookup counters and latency histogram)
//!
//! Consumers:
//!     → Diagnostic log file (operators debugging a single lookup)
//!     → stdout (tracing fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod diagnostics;
pub mod logging;
pub mod metrics;

pub use diagnostics::{Clock, DiagnosticEvent, DiagnosticLogger, SystemClock};
