//! Rate Limiter Module
//!
//! Fixed-window request budgets keyed by (route, client address).
//!
//! A window opens on the first request for a key and lasts `quota.window`.
//! Once `quota.budget` requests have been admitted, further requests are
//! rejected until the window closes; the next request then opens a fresh one.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tracing::warn;

use crate::error::AppError;
use crate::metrics::HttpMetrics;

/// Window count above which stale windows are swept before admitting.
const PRUNE_THRESHOLD: usize = 10_000;

// == Quota ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub budget: u32,
    pub window: Duration,
}

impl Quota {
    pub const fn per_minute(budget: u32) -> Self {
        Self {
            budget,
            window: Duration::from_secs(60),
        }
    }
}

/// Budget for the test-table endpoints.
pub const RECORD_QUOTA: Quota = Quota::per_minute(10);
/// Budget for the cache endpoints.
pub const CACHE_QUOTA: Quota = Quota::per_minute(30);

#[derive(Debug, Clone, Copy)]
struct Window {
    resets_at: Instant,
    admitted: u32,
}

// == Rate Limiter ==
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<(String, IpAddr), Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits or rejects one request for `route` from `client`.
    pub fn check(&self, route: &str, client: IpAddr, quota: Quota) -> bool {
        self.check_at(route, client, quota, Instant::now())
    }

    pub fn check_at(&self, route: &str, client: IpAddr, quota: Quota, now: Instant) -> bool {
        if self.windows.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut window = self
            .windows
            .entry((route.to_string(), client))
            .or_insert(Window {
                resets_at: now + quota.window,
                admitted: 0,
            });

        if now >= window.resets_at {
            *window = Window {
                resets_at: now + quota.window,
                admitted: 0,
            };
        }

        if window.admitted < quota.budget {
            window.admitted += 1;
            true
        } else {
            false
        }
    }

    /// Drops windows that have closed.
    pub fn prune(&self, now: Instant) {
        self.windows.retain(|_, window| now < window.resets_at);
    }

    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

// == Middleware ==
/// Per-route-group limiter state for `enforce_rate_limit`.
#[derive(Clone)]
pub struct RouteGuard {
    limiter: Arc<RateLimiter>,
    quota: Quota,
    metrics: Arc<HttpMetrics>,
}

impl RouteGuard {
    pub fn new(limiter: Arc<RateLimiter>, quota: Quota, metrics: Arc<HttpMetrics>) -> Self {
        Self {
            limiter,
            quota,
            metrics,
        }
    }
}

/// Client address from the connection, `127.0.0.1` when unknown.
fn client_addr(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Rejects the request with 429 before it reaches the handler once the
/// route's budget for the caller is spent.
pub async fn enforce_rate_limit(
    State(guard): State<RouteGuard>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let route = format!("{} {}", request.method(), path);
    let client = client_addr(&request);

    if guard.limiter.check(&route, client, guard.quota) {
        next.run(request).await
    } else {
        warn!(client = %client, route = %route, "Rate limit exceeded");
        guard.metrics.record_rate_limited(&path);
        AppError::RateLimited.into_response()
    }
}
