//! Sliding-window rate limiter
//!
//! The limiter remembers the instant of every call made inside the current
//! window. Once `quota` calls are recorded, the next caller sleeps until the
//! oldest of them falls out of the window.

use crate::config::ClientConfig;
use crate::error::BgpStuffError;
use log::debug;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Upper bound on the slots reserved up front for very large quotas
const MAX_PREALLOCATED: usize = 1024;

/// Sliding-window limiter allowing `quota` calls per `period`
///
/// A limiter is an ordinary owned value. To throttle several clients
/// together, wrap one limiter in an `Arc` and hand it to each of them.
///
/// # Examples
///
/// ```no_run
/// use bgpstuff::rate_limit::RateLimiter;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let limiter = RateLimiter::new(30, Duration::from_secs(60))?;
///
///     for _ in 0..31 {
///         // The 31st call sleeps until the first one leaves the window
///         limiter.acquire().await;
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    quota: usize,
    period: Duration,
    window: Mutex<VecDeque<Instant>>,
    throttled: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter allowing `quota` calls in any window of `period`
    ///
    /// Returns a configuration error if either value is zero.
    pub fn new(quota: usize, period: Duration) -> Result<Self, BgpStuffError> {
        if quota == 0 {
            return Err(BgpStuffError::Config(
                "rate limit quota must be at least 1".to_string(),
            ));
        }
        if period.is_zero() {
            return Err(BgpStuffError::Config(
                "rate limit period must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            quota,
            period,
            window: Mutex::new(VecDeque::with_capacity(quota.min(MAX_PREALLOCATED))),
            throttled: AtomicU64::new(0),
        })
    }

    /// Create a limiter from the rate-limit fields of a client configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, BgpStuffError> {
        Self::new(config.rate_limit_calls, config.rate_limit_period)
    }

    /// Maximum number of calls per window
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Length of the window
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for a free slot and record the call
    ///
    /// Returns immediately while the window has room. Otherwise the calling
    /// task sleeps until the oldest recorded call expires. The return value is
    /// the total time spent waiting.
    pub async fn acquire(&self) -> Duration {
        let mut waited = Duration::ZERO;

        loop {
            let wait = {
                let mut window = self.window.lock().await;
                let now = Instant::now();
                self.prune(&mut window, now);

                if window.len() < self.quota {
                    window.push_back(now);
                    return waited;
                }

                window
                    .front()
                    .map_or(Duration::ZERO, |&oldest| self.remaining(oldest, now))
            };

            if waited.is_zero() {
                self.throttled.fetch_add(1, Ordering::Relaxed);
            }
            debug!(
                "rate limit of {} calls per {:?} reached, sleeping {:?}",
                self.quota, self.period, wait
            );
            tokio::time::sleep(wait).await;
            waited += wait;
        }
    }

    /// Record a call if the window has room, without waiting
    ///
    /// Returns `true` if a slot was taken.
    pub async fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().await;
        let now = Instant::now();
        self.prune(&mut window, now);

        if window.len() < self.quota {
            window.push_back(now);
            true
        } else {
            false
        }
    }

    /// Number of calls that could be made right now without waiting
    pub async fn available(&self) -> usize {
        let mut window = self.window.lock().await;
        self.prune(&mut window, Instant::now());
        self.quota - window.len()
    }

    /// Time until the next slot frees up, or zero if one is free now
    pub async fn time_until_available(&self) -> Duration {
        let mut window = self.window.lock().await;
        let now = Instant::now();
        self.prune(&mut window, now);

        if window.len() < self.quota {
            return Duration::ZERO;
        }
        window
            .front()
            .map_or(Duration::ZERO, |&oldest| self.remaining(oldest, now))
    }

    /// Forget every recorded call
    pub async fn reset(&self) {
        let mut window = self.window.lock().await;
        window.clear();
    }

    /// Get statistics about the limiter
    pub async fn stats(&self) -> RateLimiterStats {
        let mut window = self.window.lock().await;
        self.prune(&mut window, Instant::now());
        RateLimiterStats {
            quota: self.quota,
            in_window: window.len(),
            throttled: self.throttled.load(Ordering::Relaxed),
        }
    }

    /// Time left before a call made at `oldest` leaves the window
    fn remaining(&self, oldest: Instant, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(oldest))
    }

    fn prune(&self, window: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = window.front() {
            if now.saturating_duration_since(oldest) >= self.period {
                window.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for RateLimiter {
    /// 30 calls per minute, the quota bgpstuff.net publishes
    fn default() -> Self {
        Self {
            quota: crate::config::DEFAULT_RATE_LIMIT_CALLS,
            period: crate::config::DEFAULT_RATE_LIMIT_PERIOD,
            window: Mutex::new(VecDeque::with_capacity(
                crate::config::DEFAULT_RATE_LIMIT_CALLS,
            )),
            throttled: AtomicU64::new(0),
        }
    }
}

/// Statistics about a rate limiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterStats {
    /// Maximum calls per window
    pub quota: usize,
    /// Calls recorded in the current window
    pub in_window: usize,
    /// Number of calls that had to wait for a slot
    pub throttled: u64,
}
