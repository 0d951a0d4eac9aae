use std::time::{Duration, Instant};
use parking_lot::Mutex;
use tokio::time::sleep;

/// Token-bucket limiter shared by every worker of one job.
/// When `bytes_per_second` is 0, no rate limiting is applied.
///
/// The bucket may run negative: a caller always takes its tokens and then
/// sleeps off whatever debt that created, so chunks larger than one second
/// of budget still make progress instead of stalling forever.
pub struct RateLimiter {
    bytes_per_second: u64,
    bucket: Mutex<Bucket>,
}

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    pub fn new(bytes_per_second: u64) -> RateLimiter {
        RateLimiter {
            bytes_per_second,
            bucket: Mutex::new(Bucket {
                tokens: bytes_per_second as f64,
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Returns true if rate limiting is disabled (unlimited speed).
    pub fn is_unlimited(&self) -> bool {
        self.bytes_per_second == 0
    }

    /// Consumes `amount` bytes of budget, sleeping until the bucket has
    /// recovered when the take overdraws it.
    pub async fn acquire(&self, amount: u64) {
        if self.is_unlimited() {
            return;
        }
        let wait = self.take(amount);
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }

    fn take(&self, amount: u64) -> Duration {
        let rate = self.bytes_per_second as f64;
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        // refill, capped at one second worth of burst
        bucket.tokens = (bucket.tokens + elapsed * rate).min(rate);
        bucket.refilled_at = now;
        bucket.tokens -= amount as f64;
        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-bucket.tokens / rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unlimited_never_waits() {
        let limiter = RateLimiter::new(0);
        assert!(limiter.is_unlimited());
        limiter.acquire(u64::MAX / 2).await;
    }

    #[test]
    fn burst_within_budget_is_free() {
        let limiter = RateLimiter::new(10_000);
        assert_eq!(limiter.take(4_000), Duration::ZERO);
        assert_eq!(limiter.take(4_000), Duration::ZERO);
    }

    #[test]
    fn overdraw_waits_proportionally() {
        let limiter = RateLimiter::new(1_000);
        // drain the initial burst, then overdraw by ~500 bytes
        assert_eq!(limiter.take(1_000), Duration::ZERO);
        let wait = limiter.take(500);
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_millis(500));
    }

    #[test]
    fn oversized_take_still_terminates() {
        let limiter = RateLimiter::new(100);
        let wait = limiter.take(1_000);
        // 900 bytes of debt at 100 B/s
        assert!(wait <= Duration::from_secs(9));
        assert!(wait > Duration::from_secs(8));
    }
}
