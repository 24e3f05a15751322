//! Fixed-window rate limiting
//!
//! Requests are counted per `(client IP, matched route)` in fixed windows.
//! A rejected request still consumes its slot, so hammering a limited
//! endpoint does not shorten the wait. Counters live in memory only and
//! reset on restart.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::utils::error::AppError;

/// Quota: `limit` requests per `window_secs` seconds
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Shared counter state for one route group
#[derive(Clone)]
pub struct RateLimitState {
    buckets: Arc<RwLock<HashMap<(IpAddr, String), Bucket>>>,
    limit: u32,
    window: Duration,
    trust_loopback: bool,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig, trust_loopback: bool) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            limit: config.limit,
            window: Duration::from_secs(config.window_secs),
            trust_loopback,
        }
    }

    /// Count a request against its bucket. `Err` means over quota; the
    /// increment is kept either way.
    pub async fn check(&self, ip: IpAddr, route: &str) -> Result<(), AppError> {
        self.check_at(ip, route, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, route: &str, now: Instant) -> Result<(), AppError> {
        if self.trust_loopback && ip.is_loopback() {
            return Ok(());
        }

        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .entry((ip, route.to_string()))
            .or_insert(Bucket {
                window_start: now,
                count: 0,
            });

        if now.duration_since(bucket.window_start) >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }

        bucket.count += 1;
        if bucket.count > self.limit {
            warn!(%ip, route, count = bucket.count, limit = self.limit, "rate limit exceeded");
            return Err(AppError::RateLimited);
        }

        Ok(())
    }

    /// Drop buckets whose window has long passed.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|_, b| now.duration_since(b.window_start) < self.window * 2);
        let removed = before - buckets.len();
        if removed > 0 {
            debug!(removed, remaining = buckets.len(), "cleaned up rate limit buckets");
        }
    }
}

/// Spawn a periodic cleanup task for a limiter's bucket map.
pub fn spawn_rate_limit_cleanup(state: RateLimitState, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.cleanup().await;
        }
    });
}

/// Layer applied per route group via `from_fn_with_state`.
///
/// The matched route pattern (not the concrete path) keys the bucket, so
/// `/employees/1` and `/employees/2` share a counter. Requests arriving
/// without connection info count against the unspecified address.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    state.check(ip, &route).await?;

    Ok(next.run(req).await)
}
