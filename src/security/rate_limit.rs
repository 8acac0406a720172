//! Per-client rolling-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::http::response::RelayError;
use crate::observability::metrics;
use crate::security::client_ip::client_key;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the oldest admitted request leaves the window.
    pub retry_after: Duration,
}

/// Rolling-window limiter keyed by client address.
///
/// Each client keeps the instants of its last `max_requests` admitted
/// requests. A request passes when fewer than `max_requests` of those fall
/// inside the `window` ending at `now`. Denied requests are not recorded.
pub struct SlidingWindowLimiter {
    admits: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: u32,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            admits: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
    }

    fn admits(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        // A panic while holding the lock cannot leave a log half-written
        self.admits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count a request from `key` at `now` and decide whether it may proceed.
    pub fn check(&self, key: &str, now: Instant) -> RateDecision {
        let mut admits = self.admits();
        let log = admits
            .entry(key.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.max_requests as usize));

        while log
            .front()
            .is_some_and(|&at| now.saturating_duration_since(at) >= self.window)
        {
            log.pop_front();
        }

        let in_window = log.len() as u32;
        let allowed = in_window < self.max_requests;
        if allowed {
            log.push_back(now);
        }

        let retry_after = log
            .front()
            .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or_default();

        RateDecision {
            allowed,
            limit: self.max_requests,
            remaining: if allowed { self.max_requests - in_window - 1 } else { 0 },
            retry_after,
        }
    }

    /// Drop clients with no admitted request left in the window. Returns how
    /// many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut admits = self.admits();
        let before = admits.len();
        admits.retain(|_, log| {
            log.back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < self.window)
        });
        before - admits.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.admits().len()
    }
}

/// State for the rate-limit middleware.
pub struct RateLimiterState {
    pub limiter: SlidingWindowLimiter,
    pub trust_proxy_hops: usize,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: SlidingWindowLimiter::from_config(config),
            trust_proxy_hops: config.trust_proxy_hops,
        }
    }
}

/// Middleware function for per-client rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = client_key(request.headers(), peer, state.trust_proxy_hops);

    let decision = state.limiter.check(&key, Instant::now());

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited("window_exceeded");
        RelayError::RateLimited {
            retry_after_secs: retry_after_secs(decision.retry_after),
        }
        .into_response()
    };

    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    response
}

/// Whole seconds for `Retry-After`, never less than one.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_request_in_window_denied() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();

        let first = limiter.check("1.2.3.4", t0);
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = limiter.check("1.2.3.4", t0 + Duration::from_millis(300));
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check("1.2.3.4", t0 + Duration::from_millis(600));
        assert!(!third.allowed);
        assert_eq!(third.retry_after, Duration::from_millis(400));
    }

    #[test]
    fn test_burst_across_window_boundary_denied() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(limiter.check("c", t0).allowed);
        assert!(limiter.check("c", t0 + Duration::from_millis(900)).allowed);
        // t0 has just left the window; one slot frees up
        assert!(limiter.check("c", t0 + Duration::from_millis(1000)).allowed);

        let burst = limiter.check("c", t0 + Duration::from_millis(1100));
        assert!(!burst.allowed);
        assert_eq!(burst.retry_after, Duration::from_millis(800));

        assert!(limiter.check("c", t0 + Duration::from_millis(1900)).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(limiter.check("a", t0).allowed);
        assert!(limiter.check("a", t0).allowed);
        assert!(!limiter.check("a", t0 + Duration::from_millis(999)).allowed);

        let after = limiter.check("a", t0 + Duration::from_secs(1));
        assert!(after.allowed);
        assert_eq!(after.remaining, 1);
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(limiter.check("a", t0).allowed);
        assert!(!limiter.check("a", t0).allowed);
        assert!(limiter.check("b", t0).allowed);
    }

    #[test]
    fn test_denied_requests_do_not_extend_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(limiter.check("a", t0).allowed);
        for ms in [100, 500, 900] {
            assert!(!limiter.check("a", t0 + Duration::from_millis(ms)).allowed);
        }
        assert!(limiter.check("a", t0 + Duration::from_millis(1000)).allowed);
    }

    #[test]
    fn test_purge_expired() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();

        limiter.check("old", t0);
        limiter.check("new", t0 + Duration::from_millis(800));
        assert_eq!(limiter.tracked_clients(), 2);

        let removed = limiter.purge_expired(t0 + Duration::from_millis(1200));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(400)), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(1001)), 2);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }
}
