use http::Method;
use std::time::Duration;

use crate::error::ApiError;

/// Retry policy for transport failures.
///
/// The default makes a single attempt. When enabled, only network errors of
/// idempotent requests (GET, PUT, DELETE) are repeated, with a linear backoff
/// of `backoff * attempt` between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Delay before the next attempt, or `None` when the error must be surfaced.
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn next_delay(&self, method: &Method, attempt: u32, err: &ApiError) -> Option<Duration> {
        if attempt >= self.max_attempts || !err.is_retryable() || !is_idempotent(method) {
            return None;
        }
        Some(self.backoff.saturating_mul(attempt))
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}
