//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: backend assumed down, requests fail fast
//! - Half-Open: testing if backend recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= failure_threshold
//! Open → Half-Open: first allow() after reset_timeout
//! Half-Open → Closed: probe request succeeds
//! Half-Open → Open: probe request fails or is abandoned (timer restarts)
//! ```
//!
//! # Design Decisions
//! - One breaker per backend endpoint, shared by every request
//! - Fail fast in Open state (no waiting for timeout)
//! - Single probe in Half-Open (prevents hammering recovering backend)
//! - All reads and transitions happen under one mutex
//! - Outcomes reported while Open are dropped

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a closed breaker for the named endpoint.
    pub fn new(name: impl Into<String>, failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn from_config(name: impl Into<String>, config: &BreakerConfig) -> Self {
        Self::new(
            name,
            config.failure_threshold,
            Duration::from_secs(config.reset_timeout_secs),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// May a call be attempted now?
    ///
    /// In Open state the first call after `reset_timeout` moves the breaker
    /// to Half-Open and is let through as the probe; every other caller is
    /// refused until the probe reports back. Callers that can be cancelled
    /// mid-call should use [`CircuitBreaker::acquire`] instead.
    pub fn allow(&self) -> bool {
        self.admit().is_some()
    }

    /// Admit a call and hand back a permit that must report its outcome.
    ///
    /// A probe permit dropped without a report counts as a failed probe, so
    /// a cancelled probe reopens the breaker instead of wedging it in
    /// Half-Open.
    pub fn acquire(&self) -> Option<Permit<'_>> {
        self.admit().map(|probe| Permit {
            breaker: self,
            probe,
            reported: false,
        })
    }

    /// Returns `Some(true)` when the admitted call is the Half-Open probe.
    fn admit(&self) -> Option<bool> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Some(false),
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed >= self.reset_timeout {
                    inner.state = BreakerState::HalfOpen;
                    inner.probe_in_flight = true;
                    tracing::info!(breaker = %self.name, "Circuit half-open, sending probe");
                    metrics::record_breaker_state(&self.name, BreakerState::HalfOpen);
                    Some(true)
                } else {
                    None
                }
            }
            BreakerState::HalfOpen => {
                if inner.probe_in_flight {
                    None
                } else {
                    inner.probe_in_flight = true;
                    Some(true)
                }
            }
        }
    }

    /// Report a successful call.
    ///
    /// Open is only left through [`allow`](Self::allow) after the reset
    /// timeout, so a late success from a call admitted before the breaker
    /// opened changes nothing.
    pub fn on_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => inner.consecutive_failures = 0,
            BreakerState::HalfOpen => {
                inner.consecutive_failures = 0;
                self.close(&mut inner);
            }
            BreakerState::Open => {}
        }
    }

    /// Report a failure that reflects backend health.
    pub fn on_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                if inner.consecutive_failures >= self.failure_threshold {
                    self.open(&mut inner);
                }
            }
            BreakerState::HalfOpen => {
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                self.open(&mut inner);
            }
            // Late report from a call admitted before the breaker opened.
            BreakerState::Open => {}
        }
    }

    fn on_abandoned_probe(&self) {
        let mut inner = self.lock();
        if inner.state == BreakerState::HalfOpen && inner.probe_in_flight {
            tracing::warn!(breaker = %self.name, "Probe abandoned before reporting");
            inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
            self.open(&mut inner);
        }
    }

    /// Report an outcome that says nothing about backend health
    /// (e.g. a rejected argument). A half-open probe that got any answer
    /// proves the backend is reachable, so the breaker closes.
    pub fn on_ignored(&self) {
        let mut inner = self.lock();
        if inner.state == BreakerState::HalfOpen {
            inner.consecutive_failures = 0;
            self.close(&mut inner);
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, inner: &mut Inner) {
        inner.state = BreakerState::Open;
        inner.opened_at = Some(Instant::now());
        inner.probe_in_flight = false;
        tracing::warn!(
            breaker = %self.name,
            failures = inner.consecutive_failures,
            reset_timeout_secs = self.reset_timeout.as_secs(),
            "Circuit opened"
        );
        metrics::record_breaker_state(&self.name, BreakerState::Open);
    }

    fn close(&self, inner: &mut Inner) {
        inner.state = BreakerState::Closed;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        tracing::info!(breaker = %self.name, "Circuit closed");
        metrics::record_breaker_state(&self.name, BreakerState::Closed);
    }
}

/// Admission to call the backend, obtained from [`CircuitBreaker::acquire`].
///
/// Consuming one of the report methods records the outcome. Dropping the
/// permit unreported is treated as a failure when it was the probe and is
/// otherwise ignored.
#[derive(Debug)]
#[must_use = "dropping a probe permit reopens the breaker"]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    reported: bool,
}

impl Permit<'_> {
    /// Whether this call is the Half-Open probe.
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn success(mut self) {
        self.reported = true;
        self.breaker.on_success();
    }

    pub fn failure(mut self) {
        self.reported = true;
        self.breaker.on_failure();
    }

    pub fn ignored(mut self) {
        self.reported = true;
        self.breaker.on_ignored();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.reported && self.probe {
            self.breaker.on_abandoned_probe();
        }
    }
}
