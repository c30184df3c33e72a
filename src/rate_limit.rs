use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Requests per second NCBI allows without an API key
pub const NCBI_DEFAULT_RATE: f64 = 3.0;

/// Requests per second NCBI allows with an API key
pub const NCBI_API_KEY_RATE: f64 = 10.0;

/// Token bucket shared by every request a client makes
///
/// Clones share the same bucket, so one limiter can be handed to concurrent tasks.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    rate: f64,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    capacity: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, rate: f64) {
        let now = Instant::now();
        let earned = now.duration_since(self.last_refill).as_secs_f64() * rate;
        self.tokens = (self.tokens + earned).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token, or report how long until one is available
    fn try_take(&mut self, rate: f64) -> Option<Duration> {
        self.refill(rate);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - self.tokens) / rate))
        }
    }
}

impl RateLimiter {
    /// Create a limiter allowing `rate` requests per second
    ///
    /// The bucket starts full and holds at least one token.
    pub fn new(rate: f64) -> Self {
        let rate = if rate > 0.0 { rate } else { NCBI_DEFAULT_RATE };
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                capacity,
                last_refill: Instant::now(),
            })),
            rate,
        }
    }

    /// The NCBI limit that applies with or without an API key
    pub fn ncbi(has_api_key: bool) -> Self {
        if has_api_key {
            Self::new(NCBI_API_KEY_RATE)
        } else {
            Self::new(NCBI_DEFAULT_RATE)
        }
    }

    /// Wait until a request may be sent
    #[instrument(skip(self))]
    pub async fn acquire(&self) {
        loop {
            let wait = self.bucket.lock().await.try_take(self.rate);
            match wait {
                None => return,
                Some(duration) => {
                    debug!(wait_ms = duration.as_millis() as u64, "Waiting for rate limit token");
                    sleep(duration).await;
                }
            }
        }
    }

    /// Tokens currently available, after refill
    pub async fn available_tokens(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.rate);
        bucket.tokens
    }

    /// Configured requests per second
    pub fn rate(&self) -> f64 {
        self.rate
    }
}
