//! Response caching for GET endpoints
//!
//! Successful GET responses are buffered and stored keyed by path plus a
//! normalized query string, then replayed until the TTL lapses. Writes do
//! not invalidate entries; the TTL bounds how stale a cached read can get.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::config::CacheConfig;
use crate::services::cache::{spawn_cache_eviction, Cache};
use crate::utils::error::AppError;

/// Cache key: request path plus order-normalized query string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: String,
    query: String,
}

impl CacheKey {
    fn from_request(req: &Request) -> Self {
        Self {
            path: req.uri().path().to_string(),
            query: normalize_query(req.uri().query().unwrap_or("")),
        }
    }
}

/// Sort query pairs so parameter order does not fragment the key space.
fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_unstable();
    pairs.join("&")
}

/// Stored response payload, replayed verbatim on a hit
#[derive(Debug, Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// Shared response cache handle
#[derive(Clone)]
pub struct ResponseCacheState {
    entries: Arc<Cache<CacheKey, CachedResponse>>,
    enabled: bool,
}

impl ResponseCacheState {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Arc::new(Cache::new(
                Duration::from_secs(config.response_ttl_secs),
                config.max_entries,
            )),
            enabled: config.enabled,
        }
    }

    /// Start the background eviction sweep, if configured.
    pub fn spawn_eviction(&self, interval_secs: u64) {
        if self.enabled && interval_secs > 0 {
            spawn_cache_eviction(self.entries.clone(), Duration::from_secs(interval_secs));
        }
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.len().await
    }
}

/// Layer applied to cacheable GET routes via `from_fn_with_state`.
pub async fn response_cache_middleware(
    State(state): State<ResponseCacheState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.enabled || req.method() != Method::GET {
        return Ok(next.run(req).await);
    }

    let key = CacheKey::from_request(&req);

    if let Some(cached) = state.entries.get(&key).await {
        debug!(path = %key.path, "response cache hit");
        return Ok(rebuild_response(&cached));
    }

    let response = next.run(req).await;

    // Only successful payloads are worth replaying
    if response.status() != StatusCode::OK {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to buffer response: {e}")))?;

    state
        .entries
        .insert(
            key,
            CachedResponse {
                status: parts.status,
                headers: parts.headers.clone(),
                body: bytes.clone(),
            },
        )
        .await;

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn rebuild_response(cached: &CachedResponse) -> Response {
    let mut response = Response::new(Body::from(cached.body.clone()));
    *response.status_mut() = cached.status;
    *response.headers_mut() = cached.headers.clone();
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_normalization_sorts_pairs() {
        assert_eq!(normalize_query("b=2&a=1"), "a=1&b=2");
        assert_eq!(normalize_query("a=1&b=2"), "a=1&b=2");
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("a=1&&b=2"), "a=1&b=2");
    }

    #[test]
    fn equivalent_queries_share_a_key() {
        let a = Request::builder()
            .uri("/products?page=2&per_page=5")
            .body(Body::empty())
            .unwrap();
        let b = Request::builder()
            .uri("/products?per_page=5&page=2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(CacheKey::from_request(&a), CacheKey::from_request(&b));
    }

    #[test]
    fn different_paths_get_different_keys() {
        let a = Request::builder()
            .uri("/products?page=1")
            .body(Body::empty())
            .unwrap();
        let b = Request::builder()
            .uri("/customers?page=1")
            .body(Body::empty())
            .unwrap();
        assert_ne!(CacheKey::from_request(&a), CacheKey::from_request(&b));
    }

    #[test]
    fn replayed_responses_keep_status_and_headers() {
        use axum::http::{header, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ETAG, HeaderValue::from_static("\"v1\""));

        let cached = CachedResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"{}"),
        };

        let response = rebuild_response(&cached);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(response.headers()[header::ETAG], "\"v1\"");
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let state = ResponseCacheState::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        });
        assert!(!state.enabled);
        assert_eq!(tokio_test::block_on(state.entry_count()), 0);
    }
}
