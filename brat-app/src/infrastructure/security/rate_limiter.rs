use brat_errors::AppError;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct RequestRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl Default for RequestRecord {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Fixed-window limiter keyed by an arbitrary string (an email address, an IP).
#[derive(Clone)]
pub struct RateLimiter {
    per_minute: u32,
    per_hour: u32,
    requests: Arc<DashMap<String, RequestRecord>>,
    last_cleanup: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            requests: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        self.maybe_cleanup();

        let now = Instant::now();
        let mut record = self.requests.entry(key.to_string()).or_default();

        if now.duration_since(record.minute_start) > Duration::from_secs(60) {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) > Duration::from_secs(3600) {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= self.per_minute {
            let wait_secs = 60u64.saturating_sub(now.duration_since(record.minute_start).as_secs());
            return Err(RateLimitError::TooManyRequestsPerMinute(wait_secs));
        }

        if record.hour_count >= self.per_hour {
            let wait_secs = 3600u64.saturating_sub(now.duration_since(record.hour_start).as_secs());
            return Err(RateLimitError::TooManyRequestsPerHour(wait_secs));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self) {
        let mut last_cleanup = self
            .last_cleanup
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last_cleanup.elapsed() > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            let now = Instant::now();
            self.requests
                .retain(|_, v| now.duration_since(v.hour_start) < Duration::from_secs(3600));
            *last_cleanup = now;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Too many requests, retry in {0}s")]
    TooManyRequestsPerMinute(u64),
    #[error("Hourly limit reached, retry in {0}s")]
    TooManyRequestsPerHour(u64),
}

impl RateLimitError {
    pub fn wait_secs(&self) -> u64 {
        match self {
            Self::TooManyRequestsPerMinute(secs) | Self::TooManyRequestsPerHour(secs) => *secs,
        }
    }
}

impl From<RateLimitError> for AppError {
    fn from(e: RateLimitError) -> Self {
        AppError::RateLimited(e.wait_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_window() {
        let limiter = RateLimiter::new(2, 10);
        assert!(limiter.check("a@example.com").is_ok());
        assert!(limiter.check("a@example.com").is_ok());
        let err = limiter.check("a@example.com").unwrap_err();
        assert!(matches!(err, RateLimitError::TooManyRequestsPerMinute(s) if s <= 60));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, 10);
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("b").is_ok());
        assert!(limiter.check("a").is_err());
    }

    #[test]
    fn test_hour_window() {
        let limiter = RateLimiter::new(10, 1);
        assert!(limiter.check("k").is_ok());
        assert!(matches!(
            limiter.check("k"),
            Err(RateLimitError::TooManyRequestsPerHour(_))
        ));
    }

    #[test]
    fn test_converts_to_app_error() {
        let err: AppError = RateLimitError::TooManyRequestsPerMinute(12).into();
        assert_eq!(err, AppError::RateLimited(12));
    }
}
