//! Integration tests for the sliding-window rate limiter

#![allow(clippy::unwrap_used)]

use bgpstuff::{BgpStuffError, ClientConfig, RateLimiter};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_window_slides_one_call_at_a_time() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60)).unwrap();
    let start = Instant::now();

    // Calls at t=0, t=20, t=40
    for _ in 0..3 {
        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(20)).await;
    }

    // t=60: the first call just expired, so one slot is free
    assert_eq!(limiter.available().await, 1);
    assert_eq!(limiter.acquire().await, Duration::ZERO);

    // Window full again; the t=20 call expires at t=80
    assert_eq!(limiter.acquire().await, Duration::from_secs(20));
    assert_eq!(start.elapsed(), Duration::from_secs(80));
}

#[tokio::test(start_paused = true)]
async fn test_never_exceeds_quota_in_any_window() {
    let quota = 5;
    let period = Duration::from_secs(60);
    let limiter = Arc::new(RateLimiter::new(quota, period).unwrap());
    let start = Instant::now();

    let calls = (0..23).map(|_| {
        let limiter = Arc::clone(&limiter);
        async move {
            limiter.acquire().await;
            start.elapsed()
        }
    });
    let mut stamps = join_all(calls).await;
    stamps.sort();

    for (i, stamp) in stamps.iter().enumerate() {
        let in_window = stamps[i..]
            .iter()
            .take_while(|other| **other - *stamp < period)
            .count();
        assert!(in_window <= quota, "{in_window} calls inside one window");
    }

    // 23 calls at 5 per minute need four full windows of waiting
    assert_eq!(stamps.last().copied(), Some(Duration::from_secs(240)));
}

#[test]
fn test_from_config() {
    let config = ClientConfig::builder()
        .rate_limit_calls(20)
        .rate_limit_period(Duration::from_secs(60))
        .build()
        .unwrap();
    let limiter = RateLimiter::from_config(&config).unwrap();
    assert_eq!(limiter.quota(), 20);
    assert_eq!(limiter.period(), Duration::from_secs(60));

    let zero = ClientConfig {
        rate_limit_calls: 0,
        ..ClientConfig::default()
    };
    assert!(matches!(
        RateLimiter::from_config(&zero),
        Err(BgpStuffError::Config(_))
    ));
}
