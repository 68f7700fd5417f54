//! Request pacing toward the portal.
//!
//! One request slot per `delay`: consecutive fetches start at least `delay`
//! apart no matter how the previous fetch ended. Time already spent since the
//! last slot (a slow fetch, parsing) counts toward the wait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Default spacing between two portal requests.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay rate limiter.
///
/// Remembers when the last slot was handed out behind a tokio Mutex. The lock
/// is held across the sleep, so concurrent callers queue up and each one
/// still gets a full delay after the previous slot.
pub struct RateLimiter {
    last_slot: Mutex<Option<Instant>>,
    delay: Duration,
    tracker: RequestTracker,
}

impl RateLimiter {
    /// One request per `delay`. A zero delay never waits.
    pub fn fixed_delay(delay: Duration) -> Self {
        Self {
            last_slot: Mutex::new(None),
            delay,
            tracker: RequestTracker::new(),
        }
    }

    /// Wait until `delay` has passed since the previous slot, then take a new
    /// one. The first call returns immediately.
    pub async fn acquire(&self) {
        if self.delay.is_zero() {
            return;
        }
        let mut last = self.last_slot.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.delay;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Access the request tracker for recording outcomes.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::fixed_delay(DEFAULT_DELAY)
    }
}

/// Atomic counters tracking request outcomes.
pub struct RequestTracker {
    pub(crate) requests_made: AtomicU64,
    pub(crate) requests_succeeded: AtomicU64,
    pub(crate) requests_failed: AtomicU64,
}

impl RequestTracker {
    fn new() -> Self {
        Self {
            requests_made: AtomicU64::new(0),
            requests_succeeded: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the current counters.
    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of tracker counters for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_acquire_is_immediate() {
        let limiter = RateLimiter::fixed_delay(Duration::from_secs(60));
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn fixed_delay_blocks_second_request() {
        tokio::time::pause();

        let limiter = Arc::new(RateLimiter::fixed_delay(Duration::from_secs(2)));
        limiter.acquire().await;

        let limiter_clone = Arc::clone(&limiter);
        let handle = tokio::spawn(async move {
            limiter_clone.acquire().await;
        });

        // Just short of the delay -- still pending
        tokio::time::advance(Duration::from_millis(1900)).await;
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_spaces_consecutive_requests() {
        let limiter = RateLimiter::fixed_delay(Duration::from_secs(2));
        let start = Instant::now();

        for _ in 0..4 {
            limiter.acquire().await;
        }

        // First slot is free, the next three each wait a full delay
        assert!(start.elapsed() >= Duration::from_secs(6));
        assert!(start.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_queue_behind_each_other() {
        let limiter = Arc::new(RateLimiter::fixed_delay(Duration::from_secs(2)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_counts_toward_delay() {
        let limiter = RateLimiter::fixed_delay(Duration::from_secs(2));
        limiter.acquire().await;

        // A slow fetch already used up the delay
        tokio::time::advance(Duration::from_secs(3)).await;

        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_never_waits() {
        let limiter = RateLimiter::fixed_delay(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn tracker_counters() {
        let tracker = RequestTracker::new();

        tracker.record_success();
        tracker.record_success();
        tracker.record_failure();

        let summary = tracker.summary();
        assert_eq!(summary.requests_made, 3);
        assert_eq!(summary.requests_succeeded, 2);
        assert_eq!(summary.requests_failed, 1);
    }

    #[test]
    fn default_is_two_second_spacing() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.delay(), Duration::from_secs(2));
    }
}
