//! Fixed-window rate limiting for login attempts.
//!
//! Each client key gets a bucket counting attempts in the current window.
//! Buckets are created lazily on first use and reset once their window has
//! elapsed. The outer map is read-locked on the hot path; its write lock is
//! only taken to insert a new key or to clean up. Each bucket has its own
//! mutex so that admission for one key is atomic without serializing other
//! keys. A bucket is only ever locked while a map guard is held, so cleanup
//! cannot drop a bucket that an admission is counting into.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::config::RateLimitSettings;

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum attempts admitted per window.
    pub max_attempts: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit configuration.
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(5, 60)
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self::new(settings.login_max_attempts, settings.login_window_secs)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Attempt is admitted.
    Allowed,
    /// Attempt is denied.
    Denied {
        /// Time until the current window ends.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Check if the attempt is admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

#[derive(Debug)]
struct Bucket {
    window_start: Instant,
    count: u32,
}

impl Bucket {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    fn is_elapsed(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }
}

/// Per-key fixed-window rate limiter.
///
/// # Example
///
/// ```
/// use tokengate::rate_limit::{LoginRateLimiter, RateLimitConfig};
///
/// let limiter = LoginRateLimiter::new(RateLimitConfig::new(2, 60));
///
/// assert!(limiter.admit("10.0.0.1").is_allowed());
/// assert!(limiter.admit("10.0.0.1").is_allowed());
/// assert!(!limiter.admit("10.0.0.1").is_allowed());
///
/// // Other clients are unaffected.
/// assert!(limiter.admit("10.0.0.2").is_allowed());
/// ```
#[derive(Debug)]
pub struct LoginRateLimiter {
    config: RateLimitConfig,
    buckets: RwLock<HashMap<String, Mutex<Bucket>>>,
}

impl LoginRateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Limiter configuration.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Run `f` on the bucket for `key`, creating it if absent.
    fn with_bucket<R>(&self, key: &str, now: Instant, f: impl FnOnce(&mut Bucket) -> R) -> R {
        {
            let read_guard = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(bucket) = read_guard.get(key) {
                let mut bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
                return f(&mut *bucket);
            }
        }

        // Another thread may have inserted the key between the two locks
        let mut write_guard = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        let bucket = write_guard
            .entry(key.to_string())
            .or_insert_with(|| Mutex::new(Bucket::new(now)));
        let mut bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *bucket)
    }

    /// Admit or deny one attempt for `key`, counting it if admitted.
    pub fn admit(&self, key: &str) -> RateLimitResult {
        self.admit_at(key, Instant::now())
    }

    /// Same as [`admit`](Self::admit) with an explicit clock reading.
    pub fn admit_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let RateLimitConfig {
            max_attempts,
            window,
        } = self.config;

        self.with_bucket(key, now, |bucket| {
            if bucket.is_elapsed(now, window) {
                *bucket = Bucket::new(now);
            }

            if bucket.count >= max_attempts {
                let elapsed = now.saturating_duration_since(bucket.window_start);
                return RateLimitResult::Denied {
                    retry_after: window.saturating_sub(elapsed),
                };
            }

            bucket.count += 1;
            RateLimitResult::Allowed
        })
    }

    /// Attempts still available to `key` in its current window.
    pub fn remaining(&self, key: &str) -> u32 {
        self.remaining_at(key, Instant::now())
    }

    fn remaining_at(&self, key: &str, now: Instant) -> u32 {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        match buckets.get(key) {
            Some(bucket) => {
                let bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
                if bucket.is_elapsed(now, self.config.window) {
                    self.config.max_attempts
                } else {
                    self.config.max_attempts.saturating_sub(bucket.count)
                }
            }
            None => self.config.max_attempts,
        }
    }

    /// Drop buckets whose window has elapsed.
    ///
    /// Call this periodically to free memory.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let window = self.config.window;
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        buckets.retain(|_, bucket| {
            let bucket = bucket.get_mut().unwrap_or_else(PoisonError::into_inner);
            !bucket.is_elapsed(now, window)
        });
    }

    /// Number of tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Start a background task that runs [`cleanup`](Self::cleanup) every `interval`.
    pub fn start_cleanup_task(self: Arc<Self>, interval: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.cleanup();
                tracing::trace!(keys = self.tracked_keys(), "Rate limiter cleanup");
            }
        });
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
