//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): time to response head
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels for method, status code and matched route pattern

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Route label for requests that matched nothing.
pub const NO_ROUTE: &str = "none";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    let route = route.to_string();

    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route.clone()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "status" => status,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}
