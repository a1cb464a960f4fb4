//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds, timeouts, buffers > 0)
//! - Check that addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut check = |ok: bool, field: &'static str, message: &str| {
        if !ok {
            errors.push(ValidationError::new(field, message));
        }
    };

    check(
        config.listener.bind_address.parse::<SocketAddr>().is_ok(),
        "listener.bind_address",
        "must be a socket address (host:port)",
    );
    check(config.listener.worker_threads > 0, "listener.worker_threads", "must be > 0");
    check(
        config.listener.max_concurrent_requests > 0,
        "listener.max_concurrent_requests",
        "must be > 0",
    );

    check(!config.backend.host.trim().is_empty(), "backend.host", "must not be empty");
    check(config.backend.port > 0, "backend.port", "must be > 0");
    check(config.backend.connect_timeout_ms > 0, "backend.connect_timeout_ms", "must be > 0");

    check(config.breaker.failure_threshold >= 1, "breaker.failure_threshold", "must be >= 1");
    check(config.breaker.reset_timeout_secs > 0, "breaker.reset_timeout_secs", "must be > 0");

    check(config.retries.max_attempts >= 1, "retries.max_attempts", "must be >= 1");
    check(!config.retries.delays_ms.is_empty(), "retries.delays_ms", "must not be empty");

    check(config.timeouts.mutation_ms > 0, "timeouts.mutation_ms", "must be > 0");
    check(config.timeouts.read_ms > 0, "timeouts.read_ms", "must be > 0");
    check(config.timeouts.scan_ms > 0, "timeouts.scan_ms", "must be > 0");
    check(config.timeouts.request_secs > 0, "timeouts.request_secs", "must be > 0");

    check(
        config.rpc.bind_address.parse::<SocketAddr>().is_ok(),
        "rpc.bind_address",
        "must be a socket address (host:port)",
    );
    check(config.rpc.worker_threads > 0, "rpc.worker_threads", "must be > 0");
    check(
        config.rpc.concurrency_per_connection > 0,
        "rpc.concurrency_per_connection",
        "must be > 0",
    );
    check(config.rpc.stream_buffer > 0, "rpc.stream_buffer", "must be > 0");

    if config.observability.metrics_enabled {
        check(
            config.observability.metrics_address.parse::<SocketAddr>().is_ok(),
            "observability.metrics_address",
            "must be a socket address (host:port)",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
