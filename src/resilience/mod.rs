//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Mutating request to backend:
//!     → retries.rs (attempt loop, positional backoff from backoff.rs)
//!     → circuit_breaker.rs (gate check before each attempt)
//!     → timeouts.rs (deadline around the single attempt)
//!     → backend call
//!     ← classify outcome: success / terminal / circuit failure
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - Only mutations go through retries; reads are single attempts
//! - Circuit breaker prevents hammering a failing backend
//! - Breaker open and retries exhausted stay distinguishable to callers

pub mod backoff;
pub mod circuit_breaker;
pub mod retries;
pub mod timeouts;

pub use backoff::BackoffSchedule;
pub use circuit_breaker::{BreakerSnapshot, BreakerState, CircuitBreaker, Permit};
pub use retries::{classify, FailureClass, GatewayError, RetryOrchestrator};
pub use timeouts::{with_deadline, Deadlines};
