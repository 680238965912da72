//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_auth_rejections_total` (counter): 401s by reason
//! - `gateway_sessions_issued_total` (counter): tokens minted
//! - `gateway_sessions_swept_total` (counter): expired sessions removed
//! - `gateway_sessions_active` (gauge): sessions held after the last sweep
//!
//! # Design Decisions
//! - Exporter is opt-in and bound to loopback by validation
//! - Labels are low-cardinality: no paths, no origins, no tokens

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected at the trust boundary.
pub fn record_auth_rejection(reason: &'static str) {
    metrics::counter!("gateway_auth_rejections_total", "reason" => reason).increment(1);
}

pub fn record_session_issued() {
    metrics::counter!("gateway_sessions_issued_total").increment(1);
}

pub fn record_sessions_swept(count: usize) {
    metrics::counter!("gateway_sessions_swept_total").increment(count as u64);
}

pub fn record_active_sessions(count: usize) {
    metrics::gauge!("gateway_sessions_active").set(count as f64);
}
