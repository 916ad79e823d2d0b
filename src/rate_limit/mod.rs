//! Client-side rate limiting for outbound API requests

pub mod limiter;

pub use limiter::{RateLimiter, RateLimiterStats};
