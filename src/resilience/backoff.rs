//! Positional backoff schedule.

use std::time::Duration;

/// Fixed delays indexed by attempt number.
///
/// Entry `n - 1` is the wait before attempt `n`; attempt 1 uses the first
/// entry (normally zero). Attempts past the end reuse the last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    delays: Vec<Duration>,
}

impl BackoffSchedule {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_millis(delays_ms: &[u64]) -> Self {
        Self::new(delays_ms.iter().copied().map(Duration::from_millis).collect())
    }

    /// Delay to wait before `attempt` (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if self.delays.is_empty() {
            return Duration::ZERO;
        }
        let idx = (attempt.max(1) as usize - 1).min(self.delays.len() - 1);
        self.delays[idx]
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::from_millis(&[0, 100, 200])
    }
}
