//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): facade requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): facade latency
//! - `gateway_backend_attempts_total` (counter): backend attempts by operation, result
//! - `gateway_fail_fast_total` (counter): calls refused by an open breaker
//! - `gateway_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `rpc_calls_total` (counter): RPC calls by method, result code
//! - `rpc_items_streamed_total` (counter): records emitted by streaming calls
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Exporter is optional and only serves the Prometheus scrape endpoint

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::resilience::BreakerState;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed facade request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one backend attempt made by the retry orchestrator.
pub fn record_backend_attempt(operation: &'static str, result: &'static str) {
    counter!("gateway_backend_attempts_total", "operation" => operation, "result" => result)
        .increment(1);
}

/// Record a call refused because the breaker is open.
pub fn record_fail_fast(operation: &'static str) {
    counter!("gateway_fail_fast_total", "operation" => operation).increment(1);
}

/// Record a breaker transition.
pub fn record_breaker_state(breaker: &str, state: BreakerState) {
    let value = match state {
        BreakerState::Closed => 0.0,
        BreakerState::HalfOpen => 1.0,
        BreakerState::Open => 2.0,
    };
    gauge!("gateway_breaker_state", "breaker" => breaker.to_string()).set(value);
}

/// Record an RPC call result.
pub fn record_rpc(method: &'static str, code: &'static str) {
    counter!("rpc_calls_total", "method" => method, "code" => code).increment(1);
}

/// Record how many records a streaming call emitted.
pub fn record_streamed(method: &'static str, count: u64) {
    counter!("rpc_items_streamed_total", "method" => method).increment(count);
}
