//! HTTP API route definitions
//!
//! Routes are grouped per resource module. Each module wires its own role,
//! rate-limit and cache layers; authentication for the protected group is
//! applied once in `crate::router`.

use axum::Router;

use crate::AppState;

pub mod analytics;
pub mod auth;
pub mod customers;
pub mod employees;
pub mod health;
pub mod orders;
pub mod production;
pub mod products;
pub mod users;

/// Routes reachable without a token
pub fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/auth", auth::public_routes(state))
}

/// Routes behind the authentication middleware
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::protected_routes(state))
        .nest("/employees", employees::routes(state))
        .nest("/products", products::routes(state))
        .nest("/customers", customers::routes(state))
        .nest("/orders", orders::routes(state))
        .nest("/production", production::routes(state))
        .nest("/users", users::routes(state))
        .nest("/analytics", analytics::routes(state))
}
