//! Fixed-interval request gate
//!
//! Keeps successive outbound request starts at least `min_interval` apart.
//! It only ever delays a caller, never rejects one.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// SEC fair-access spacing used by this agent
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(3000);

pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next request may start, then record it as started.
    ///
    /// The lock stays held while sleeping so concurrent callers queue up
    /// behind each other instead of computing overlapping windows.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                debug!(wait_ms = remaining.as_millis() as u64, "Rate limiter delaying request");
                tokio::time::sleep(remaining).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_call_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(300));

        limiter.wait().await;
        let first = Instant::now();
        limiter.wait().await;

        assert!(first.elapsed() >= Duration::from_millis(290));
    }

    #[tokio::test]
    async fn test_no_wait_when_interval_already_elapsed() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.wait().await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_concurrent_callers_do_not_overlap() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(200)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.wait().await;
                    Instant::now()
                })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();

        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(190));
        }
        assert!(start.elapsed() >= Duration::from_millis(390));
    }
}
