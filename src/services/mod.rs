//! Business logic services

pub mod auth;
pub mod cache;
pub mod token;

pub use auth::AuthService;
pub use cache::Cache;
pub use token::{Claims, TokenError, TokenService};
