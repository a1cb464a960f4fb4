//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! gateway and the item service. All types derive Serde traits for
//! deserialization from config files, and every field has a default.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Gateway listener (bind address, worker pool).
    pub listener: ListenerConfig,

    /// RPC backend the gateway talks to.
    pub backend: BackendConfig,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Item service (gRPC server) settings.
    pub rpc: RpcConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Gateway listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Runtime worker threads serving requests.
    pub worker_threads: usize,

    /// Maximum requests processed at once (backpressure).
    pub max_concurrent_requests: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            worker_threads: 10,
            max_concurrent_requests: 1024,
        }
    }
}

/// Location of the item service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl BackendConfig {
    /// Endpoint URI understood by the gRPC client.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 50051,
            connect_timeout_ms: 1000,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,

    /// Seconds the circuit stays open before a probe is allowed.
    pub reset_timeout_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            reset_timeout_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per mutating request, including the first.
    pub max_attempts: u32,

    /// Delay before each attempt in milliseconds, by position.
    /// A schedule shorter than `max_attempts` reuses its last entry.
    pub delays_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delays_ms: vec![0, 100, 200],
        }
    }
}

/// Timeout configuration for backend calls and whole requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for create/update/delete calls.
    pub mutation_ms: u64,

    /// Deadline for single-item reads.
    pub read_ms: u64,

    /// Deadline for full scans.
    pub scan_ms: u64,

    /// Upper bound on one facade request, retries included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            mutation_ms: 1000,
            read_ms: 1000,
            scan_ms: 5000,
            request_secs: 30,
        }
    }
}

/// Item service configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Bind address for the gRPC server.
    pub bind_address: String,

    /// Runtime worker threads serving calls.
    pub worker_threads: usize,

    /// Concurrent calls allowed on one client connection.
    pub concurrency_per_connection: usize,

    /// Bounded buffer between stream producers and the transport.
    pub stream_buffer: usize,

    /// First id handed out by bulk add.
    pub first_id: i64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:50051".to_string(),
            worker_threads: 10,
            concurrency_per_connection: 64,
            stream_buffer: 16,
            first_id: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9103".to_string(),
        }
    }
}
