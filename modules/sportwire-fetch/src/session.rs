use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Gates concurrent access to the fetcher's underlying client. A real
/// headless-browser-backed fetcher could only ever drive one page at a
/// time per worker; this mirrors that constraint (and the original's
/// `self.delay` rate limit) as a bounded semaphore rather than a hand-rolled
/// sleep loop.
#[derive(Clone)]
pub struct SessionPool {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
}

impl SessionPool {
    pub fn new(concurrency: usize, min_interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            min_interval,
        }
    }

    /// Acquires a session. Released on every exit path — drop, return, or
    /// panic — via the permit's own `Drop` impl (spec.md §4.1: "acquires a
    /// session on enter and releases it on all exit paths including
    /// panics").
    pub async fn acquire(&self) -> FetchSession {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("session semaphore never closed");
        debug!("fetch session acquired");
        if !self.min_interval.is_zero() {
            tokio::time::sleep(self.min_interval).await;
        }
        FetchSession { _permit: permit }
    }
}

pub struct FetchSession {
    _permit: OwnedSemaphorePermit,
}

impl Drop for FetchSession {
    fn drop(&mut self) {
        debug!("fetch session released");
    }
}
