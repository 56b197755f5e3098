//! Shared rate-limiting gate for outbound calls.

use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::Instant;

/// Caps requests in flight and spaces request starts.
///
/// Every transport call passes through one gate, so workers wait here and
/// never on each other.
#[derive(Debug)]
pub struct RateGate {
    permits: Semaphore,
    min_interval: Duration,
    next_start: Mutex<Instant>,
}

/// Held for the duration of one request.
#[derive(Debug)]
pub struct GatePermit<'a> {
    _permit: Option<SemaphorePermit<'a>>,
}

impl RateGate {
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            permits: Semaphore::new(max_concurrent.max(1)),
            min_interval,
            next_start: Mutex::new(Instant::now()),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(Semaphore::MAX_PERMITS, Duration::ZERO)
    }

    pub async fn acquire(&self) -> GatePermit<'_> {
        // The semaphore is never closed, so acquisition only fails in theory.
        let permit = self.permits.acquire().await.ok();

        if !self.min_interval.is_zero() {
            let mut next = self.next_start.lock().await;
            tokio::time::sleep_until(*next).await;
            *next = Instant::now() + self.min_interval;
        }

        GatePermit { _permit: permit }
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
