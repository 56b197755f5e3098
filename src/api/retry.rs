//! Retry policy for transport calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::models::ApiConfig;

/// Computes the delay before retry `n` (0-based: the wait after attempt `n`).
pub type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// How many times a call is attempted and how long to wait in between.
///
/// The delay is only applied between attempts, never after the last one.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffFn,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: impl Fn(u32) -> Duration + Send + Sync + 'static) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Arc::new(backoff),
        }
    }

    /// `base * 2^n` plus a uniform random jitter in `[0, max_jitter]`.
    pub fn exponential(max_attempts: u32, base: Duration, max_jitter: Duration) -> Self {
        Self::new(max_attempts, move |attempt| {
            let step = base.saturating_mul(2u32.saturating_pow(attempt));
            step.saturating_add(jitter(max_jitter))
        })
    }

    /// Retries without waiting.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, |_| Duration::ZERO)
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::exponential(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_jitter_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after failed attempt `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }

    /// Whether another attempt follows attempt `attempt`.
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

fn jitter(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}
