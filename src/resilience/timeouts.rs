//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap backend calls with a deadline
//! - Turn an expired deadline into `CallError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner call is dropped on expiry
//! - Timeouts count as backend failures for the breaker

use std::future::Future;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::error::{CallError, CallOutcome};

/// Run `call`, failing with [`CallError::Timeout`] once `deadline` passes.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> CallOutcome<T>
where
    F: Future<Output = CallOutcome<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::debug!(deadline_ms = deadline.as_millis() as u64, "Backend call timed out");
            Err(CallError::Timeout)
        }
    }
}

/// Per-operation deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub mutation: Duration,
    pub read: Duration,
    pub scan: Duration,
}

impl From<&TimeoutConfig> for Deadlines {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            mutation: Duration::from_millis(config.mutation_ms),
            read: Duration::from_millis(config.read_ms),
            scan: Duration::from_millis(config.scan_ms),
        }
    }
}

impl Default for Deadlines {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let outcome: CallOutcome<()> = with_deadline(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(outcome, Err(CallError::Timeout));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let outcome = with_deadline(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(outcome, Ok(7));

        let failed: CallOutcome<u8> = with_deadline(Duration::from_secs(1), async {
            Err(CallError::NotFound("x".into()))
        })
        .await;
        assert_eq!(failed, Err(CallError::NotFound("x".into())));
    }
}
