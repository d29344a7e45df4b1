//! Metrics collection and exposition.
//!
//! # Metrics
//! - `kernel_requests_total` (counter): requests by status code
//! - `kernel_request_duration_seconds` (histogram): latency distribution
//! - `kernel_dispatch_miss_total` (counter): requests no route matched
//! - `kernel_fatal_total` (counter): requests answered by the fatal path
//! - `kernel_routes` (gauge): routes in the live registry
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - The Prometheus exporter is only started by the HTTP host

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(status: u16, start: Instant) {
    counter!("kernel_requests_total", "status" => status.to_string()).increment(1);
    histogram!("kernel_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_dispatch_miss() {
    counter!("kernel_dispatch_miss_total").increment(1);
}

pub fn record_fatal() {
    counter!("kernel_fatal_total").increment(1);
}

pub fn record_route_count(count: usize) {
    gauge!("kernel_routes").set(count as f64);
}
