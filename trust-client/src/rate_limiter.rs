//! Trailing-window rate limiter
//!
//! Admits at most `max_per_window` calls in any trailing window (1 second by
//! default). The window lives behind a tokio mutex held across the wait, so
//! concurrent callers are admitted in arrival order.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Length of the trailing window
pub const WINDOW: Duration = Duration::from_millis(1000);

/// Rate limiter enforcing N admissions per trailing window
pub struct RateLimiter {
    window: Mutex<VecDeque<Instant>>,
    max_per_window: usize,
    window_len: Duration,
    jitter: Duration,
}

impl RateLimiter {
    /// `max_per_window == 0` disables limiting
    pub fn new(max_per_window: u32, jitter: Duration) -> Self {
        Self::with_window(max_per_window, WINDOW, jitter)
    }

    pub fn with_window(max_per_window: u32, window_len: Duration, jitter: Duration) -> Self {
        Self {
            window: Mutex::new(VecDeque::new()),
            max_per_window: max_per_window as usize,
            window_len,
            jitter,
        }
    }

    /// Wait until a call may proceed, then record it
    pub async fn acquire(&self) {
        if self.max_per_window == 0 {
            return;
        }

        let mut window = self.window.lock().await;

        loop {
            let now = Instant::now();
            while let Some(oldest) = window.front().copied() {
                if now.duration_since(oldest) >= self.window_len {
                    window.pop_front();
                } else {
                    break;
                }
            }

            let oldest = match window.front().copied() {
                Some(oldest) if window.len() >= self.max_per_window => oldest,
                _ => {
                    window.push_back(now);
                    return;
                }
            };

            let wait_time = self
                .window_len
                .saturating_sub(now.duration_since(oldest))
                + self.jitter;

            tracing::debug!(
                in_window = window.len(),
                limit = self.max_per_window,
                "Rate limiting: waiting {:?}",
                wait_time
            );
            tokio::time::sleep(wait_time).await;
        }
    }

    /// Admissions currently inside the trailing window
    pub async fn in_flight_window(&self) -> usize {
        let window = self.window.lock().await;
        let now = Instant::now();
        window
            .iter()
            .filter(|t| now.duration_since(**t) < self.window_len)
            .count()
    }

    pub fn limit(&self) -> usize {
        self.max_per_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(10, Duration::from_millis(10));
        assert_eq!(limiter.limit(), 10);
        assert_eq!(limiter.window_len, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_under_limit_no_wait() {
        let limiter = RateLimiter::new(5, Duration::ZERO);
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.in_flight_window().await, 5);
    }

    #[tokio::test]
    async fn test_eleventh_admission_waits_for_window() {
        let limiter = RateLimiter::new(10, Duration::from_millis(10));
        let start = Instant::now();

        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));

        limiter.acquire().await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(1000), "admitted after {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_huge_ceiling_allocates_lazily() {
        let limiter = RateLimiter::new(u32::MAX, Duration::ZERO);
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.in_flight_window().await, 3);
    }

    #[tokio::test]
    async fn test_disabled_limiter_never_waits() {
        let limiter = RateLimiter::new(0, Duration::from_millis(10));
        let start = Instant::now();

        for _ in 0..100 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_window() {
        let limiter = Arc::new(RateLimiter::with_window(
            2,
            Duration::from_millis(200),
            Duration::ZERO,
        ));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.unwrap());
        }
        admitted.sort();

        assert!(admitted[1] < Duration::from_millis(100));
        assert!(admitted[2] >= Duration::from_millis(200));
        assert!(admitted[3] >= Duration::from_millis(200));
    }
}
