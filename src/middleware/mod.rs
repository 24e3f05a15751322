//! Request middleware: authentication, role checks, rate limiting and
//! response caching

pub mod auth;
pub mod cache;
pub mod rate_limit;

pub use auth::{auth_middleware, require_role, AuthUser};
pub use cache::{response_cache_middleware, ResponseCacheState};
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimitState};
