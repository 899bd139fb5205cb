//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_lookups_total` (counter): lookups by outcome
//! - `relay_lookup_duration_seconds` (histogram): end-to-end lookup latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished lookup. `outcome` is a short stable label.
pub fn record_lookup(outcome: &'static str, start: Instant) {
    counter!("relay_lookups_total", "outcome" => outcome).increment(1);
    histogram!("relay_lookup_duration_seconds").record(start.elapsed().as_secs_f64());
}
