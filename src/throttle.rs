//! Token-bucket rate limiter shared by every outbound GitHub call.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::cancel::CancelToken;
use crate::error::TrainError;

/// Longest single sleep. `wait` re-checks the bucket after each one.
const MAX_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Steady-rate throttle with a burst allowance.
///
/// The bucket starts full. A non-positive or non-finite rate disables throttling.
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// `burst` of zero is treated as one.
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            rate: requests_per_second,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0.0, 1)
    }

    pub fn is_unlimited(&self) -> bool {
        !(self.rate.is_finite() && self.rate > 0.0)
    }

    /// Wait for a token and consume it.
    ///
    /// Fails with `TrainError::Cancelled` if `cancel` fires first.
    pub async fn wait(&self, cancel: &CancelToken) -> Result<(), TrainError> {
        loop {
            cancel.check()?;

            let Some(delay) = self.try_acquire() else {
                return Ok(());
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(TrainError::Cancelled),
            }
        }
    }

    /// Take a token if one is available, otherwise return how long until one is.
    fn try_acquire(&self) -> Option<Duration> {
        if self.is_unlimited() {
            return None;
        }

        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            None
        } else {
            let secs = (1.0 - bucket.tokens) / self.rate;
            let delay = Duration::try_from_secs_f64(secs).unwrap_or(MAX_WAIT);
            Some(delay.min(MAX_WAIT))
        }
    }
}
