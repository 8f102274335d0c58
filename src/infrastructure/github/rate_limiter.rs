use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Token bucket rate limiter shared by every outbound request in a run
///
/// Implements the token bucket algorithm so that concurrent callers together
/// stay within the configured request rate.
///
/// # Algorithm
/// - Capacity: maximum number of tokens (burst size)
/// - Refill rate: tokens added per second
/// - On acquire: wait until at least 1 token is available, then consume it
/// - Refill: tokens = min(tokens + elapsed_seconds * refill_rate, capacity)
///
/// With a rate of 1 and a burst of 1 the first request proceeds at once and
/// each later one waits a full second after its predecessor.
#[derive(Clone)]
pub struct TokenBucketRateLimiter {
    /// Current number of available tokens
    tokens: Arc<Mutex<f64>>,
    /// Maximum token capacity
    capacity: f64,
    /// Tokens added per second
    refill_rate: f64,
    /// Last time tokens were refilled
    last_refill: Arc<Mutex<Instant>>,
}

impl TokenBucketRateLimiter {
    /// Create a rate limiter allowing `requests_per_second` with bursts of up to `burst` requests
    ///
    /// A non-positive or non-finite rate falls back to one request per second and a
    /// zero burst to one; configuration validation rejects both before they get here.
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        let refill_rate = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            requests_per_second
        } else {
            1.0
        };
        let capacity = f64::from(burst.max(1));

        Self {
            tokens: Arc::new(Mutex::new(capacity)), // Start with full capacity
            capacity,
            refill_rate,
            last_refill: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Acquire a token from the bucket, waiting if necessary
    ///
    /// Tokens are refilled based on the elapsed time since the last refill.
    pub async fn acquire(&self) {
        loop {
            let mut tokens = self.tokens.lock().await;
            let mut last_refill = self.last_refill.lock().await;

            // Refill tokens based on elapsed time
            let now = Instant::now();
            let elapsed = now.duration_since(*last_refill).as_secs_f64();
            let new_tokens = (*tokens + elapsed * self.refill_rate).min(self.capacity);

            if new_tokens >= 1.0 {
                *tokens = new_tokens - 1.0;
                *last_refill = now;
                return;
            }

            // Not enough yet; bank what has accrued and wait for the remainder
            *tokens = new_tokens;
            *last_refill = now;
            let tokens_needed = 1.0 - new_tokens;
            let wait_duration = Duration::from_secs_f64((tokens_needed / self.refill_rate).max(0.001));

            // Release locks before sleeping
            drop(tokens);
            drop(last_refill);

            sleep(wait_duration).await;
        }
    }

    /// Get the current number of available tokens (for testing/monitoring)
    pub async fn available_tokens(&self) -> f64 {
        let tokens = self.tokens.lock().await;
        let last_refill = self.last_refill.lock().await;

        let elapsed = Instant::now().duration_since(*last_refill).as_secs_f64();
        (*tokens + elapsed * self.refill_rate).min(self.capacity)
    }
}

impl std::fmt::Debug for TokenBucketRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucketRateLimiter")
            .field("capacity", &self.capacity)
            .field("refill_rate", &self.refill_rate)
            .finish_non_exhaustive()
    }
}
