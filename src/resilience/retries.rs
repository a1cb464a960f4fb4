//! Retry logic.
//!
//! # Responsibilities
//! - Consult the circuit breaker before every attempt
//! - Classify each failure as a circuit failure or a terminal outcome
//! - Retry circuit failures on a fixed positional schedule
//!
//! # Design Decisions
//! - Sole retry authority: neither the RPC service nor the facade retries
//! - A refused attempt is not an attempt and not a failure (fail fast)
//! - Not-found, invalid-argument and duplicate-key answers are terminal
//! - The inter-attempt sleep only suspends the calling task
//! - Each attempt holds a breaker permit, so a cancelled probe still reports

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RetryConfig;
use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::backoff::BackoffSchedule;
use crate::resilience::circuit_breaker::CircuitBreaker;

/// How a failed attempt is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Backend health problem: counted by the breaker and retried.
    CircuitFailure,
    /// Answer about the request itself: returned immediately.
    Terminal,
}

/// Classify a backend error.
pub fn classify(err: &CallError) -> FailureClass {
    match err {
        CallError::Unavailable(_) | CallError::Timeout | CallError::Internal(_) => {
            FailureClass::CircuitFailure
        }
        CallError::NotFound(_) | CallError::InvalidArgument(_) | CallError::AlreadyExists(_) => {
            FailureClass::Terminal
        }
    }
}

/// Why a guarded call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The breaker refused the call; the backend was not contacted.
    #[error("circuit breaker is open")]
    BreakerOpen,

    /// Every attempt failed with a circuit failure.
    #[error("backend failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: CallError },

    /// The backend gave an answer that retrying cannot change.
    #[error(transparent)]
    Terminal(CallError),
}

/// Bounded retry loop guarded by a circuit breaker.
#[derive(Debug, Clone)]
pub struct RetryOrchestrator {
    breaker: Arc<CircuitBreaker>,
    max_attempts: u32,
    schedule: BackoffSchedule,
}

impl RetryOrchestrator {
    pub fn new(breaker: Arc<CircuitBreaker>, max_attempts: u32, schedule: BackoffSchedule) -> Self {
        Self {
            breaker,
            max_attempts: max_attempts.max(1),
            schedule,
        }
    }

    pub fn from_config(breaker: Arc<CircuitBreaker>, config: &RetryConfig) -> Self {
        Self::new(
            breaker,
            config.max_attempts,
            BackoffSchedule::from_millis(&config.delays_ms),
        )
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, hits a terminal outcome, is
    /// refused by the breaker, or runs out of attempts.
    pub async fn execute<T, F, Fut>(
        &self,
        operation_name: &'static str,
        mut operation: F,
    ) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = self.schedule.delay_before(attempt);
                tracing::info!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying backend call"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            let Some(permit) = self.breaker.acquire() else {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    breaker = %self.breaker.name(),
                    "Circuit breaker is open, failing fast"
                );
                metrics::record_fail_fast(operation_name);
                return Err(GatewayError::BreakerOpen);
            };

            // Dropping `permit` mid-call (timeout, client gone) settles a probe.
            match operation().await {
                Ok(value) => {
                    permit.success();
                    metrics::record_backend_attempt(operation_name, "success");
                    tracing::debug!(operation = operation_name, attempt, "Backend call succeeded");
                    return Ok(value);
                }
                Err(e) => match classify(&e) {
                    FailureClass::Terminal => {
                        permit.ignored();
                        metrics::record_backend_attempt(operation_name, e.kind());
                        tracing::debug!(operation = operation_name, error = %e, "Terminal backend outcome");
                        return Err(GatewayError::Terminal(e));
                    }
                    FailureClass::CircuitFailure => {
                        permit.failure();
                        metrics::record_backend_attempt(operation_name, e.kind());
                        tracing::warn!(
                            operation = operation_name,
                            attempt,
                            max_attempts = self.max_attempts,
                            error = %e,
                            "Backend call failed"
                        );
                        last_error = Some(e);
                    }
                },
            }
        }

        tracing::error!(
            operation = operation_name,
            attempts = self.max_attempts,
            "All retries exhausted"
        );
        Err(GatewayError::RetriesExhausted {
            attempts: self.max_attempts,
            last: last_error.unwrap_or(CallError::Internal("no attempt was made".to_string())),
        })
    }
}
