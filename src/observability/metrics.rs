//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by format, status
//! - `relay_request_duration_seconds` (histogram): latency by format
//! - `relay_cache_lookups_total` (counter): cache hits and misses
//! - `relay_cache_entries` (gauge): live cache entries
//! - `relay_upstream_fetches_total` (counter): upstream exchanges by method, outcome
//! - `relay_upstream_duration_seconds` (histogram): upstream latency by method

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished inbound request.
pub fn record_request(format: &str, status: u16, start: Instant) {
    counter!(
        "relay_requests_total",
        "format" => format.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds", "format" => format.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("relay_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("relay_cache_entries").set(entries as f64);
}

/// Record one upstream exchange. `outcome` is `ok` or an error label.
pub fn record_upstream_fetch(method: &str, outcome: &'static str, start: Instant) {
    counter!(
        "relay_upstream_fetches_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("relay_upstream_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
