//! Authentication and role-check middleware
//!
//! `auth_middleware` wraps every protected route: it pulls the bearer token
//! from the `Authorization` header, verifies it, and stores the identity in
//! the request extensions. `require_role` layers a role check on top for
//! route groups that need more than a valid token.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::models::Role;
use crate::services::token::TokenError;
use crate::utils::error::AppError;
use crate::AppState;

/// Authenticated identity, inserted into request extensions by
/// `auth_middleware` and available to handlers as an extractor.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("Authentication required.".to_string()))
    }
}

fn extract_bearer_token(req: &Request) -> Result<&str, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Authorization token is missing.".to_string()))?;

    let value = header_value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header.".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header.".to_string()))
}

/// Verify the bearer token and attach the caller's identity to the request.
///
/// Rejections short-circuit here; the handler chain never runs for a
/// missing, malformed or expired credential.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    let claims = state.tokens.verify(token).map_err(|e| match e {
        TokenError::Expired => AppError::Unauthorized(e.to_string()),
        TokenError::Malformed => AppError::Unauthorized(e.to_string()),
    })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Build a role-check layer for use with `axum::middleware::from_fn`.
///
/// Access passes when the caller's role equals the required one or is
/// `super_admin`. Runs after `auth_middleware`, so a missing identity here
/// means the route was wired up without authentication.
pub fn require_role(
    required: Role,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>> + Clone
{
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<AuthUser>()
                .copied()
                .ok_or_else(|| AppError::Unauthorized("Authentication required.".to_string()))?;

            if !user.role.satisfies(required) {
                return Err(AppError::Forbidden("Insufficient permissions.".to_string()));
            }

            Ok(next.run(req).await)
        })
    }
}
