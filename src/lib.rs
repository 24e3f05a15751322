//! Factory Management API Library
//!
//! This crate provides the core functionality for the factory management
//! HTTP API: authentication, role-based authorization, rate limiting,
//! response caching and paginated resource access.

use std::sync::Arc;

use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser};

use middleware::{cache::ResponseCacheState, rate_limit::RateLimitState};
use services::token::TokenService;
use utils::error::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Token issuance and verification service
    pub tokens: Arc<TokenService>,
    /// Rate limiter for read (GET) endpoints
    pub read_limiter: RateLimitState,
    /// Rate limiter for write (POST/PUT/DELETE) endpoints
    pub write_limiter: RateLimitState,
    /// Rate limiter for login/registration endpoints
    pub auth_limiter: RateLimitState,
    /// Shared response cache for GET endpoints
    pub response_cache: ResponseCacheState,
}

impl AppState {
    /// Construct the full application state from configuration and a pool.
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_expiry_hours,
        ));
        let trust_loopback = config.rate_limit.trust_loopback;
        Self {
            tokens,
            read_limiter: RateLimitState::new(&config.rate_limit.read, trust_loopback),
            write_limiter: RateLimitState::new(&config.rate_limit.write, trust_loopback),
            auth_limiter: RateLimitState::new(&config.rate_limit.auth, trust_loopback),
            response_cache: ResponseCacheState::new(&config.cache),
            config,
            db,
        }
    }
}

/// Build the application router with all routes and middleware.
///
/// Public routes (login, health) stay unauthenticated; every protected route
/// passes through the authentication middleware before any per-route role,
/// rate-limit or cache layer runs.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(api::public_routes(&state))
        .merge(
            api::protected_routes(&state).layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth::auth_middleware,
            )),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
