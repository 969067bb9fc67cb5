use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota};

/// Token bucket shared by every worker of a dispatcher.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
    per_minute: NonZeroU32,
}

impl RateLimiter {
    /// `per_minute` permits per minute with a burst of one, so calls are
    /// spaced evenly. Zero is treated as one.
    pub fn per_minute(per_minute: u32) -> Self {
        Self::with_burst(per_minute, 1)
    }

    pub fn with_burst(per_minute: u32, burst: u32) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        Self {
            inner: DefaultDirectRateLimiter::direct(quota),
            per_minute,
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.per_minute.get()
    }

    /// Wait until a permit is available and take it.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }

    /// Take a permit if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_one_refuses_back_to_back_permits() {
        let limiter = RateLimiter::per_minute(15);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn larger_burst_allows_that_many_immediately() {
        let limiter = RateLimiter::with_burst(60, 3);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn zero_rate_is_clamped() {
        assert_eq!(RateLimiter::per_minute(0).requests_per_minute(), 1);
    }

    #[tokio::test]
    async fn acquire_returns_when_permit_available() {
        let limiter = RateLimiter::per_minute(600);
        limiter.acquire().await;
        assert!(!limiter.try_acquire());
    }
}
