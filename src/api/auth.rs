//! Login and user registration

use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::db::UserRepository;
use crate::middleware::auth::require_role;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{CreateUserRequest, LoginRequest, Role};
use crate::services::AuthService;
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::AppState;

/// `POST /auth/login`, throttled by the auth limiter
pub fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new().route("/login", post(login)).layer(from_fn_with_state(
        state.auth_limiter.clone(),
        rate_limit_middleware,
    ))
}

/// `POST /auth/register`, super_admin only
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .layer(from_fn_with_state(
            state.auth_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::SuperAdmin)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required.".to_string(),
        ));
    }

    let auth = AuthService::new(state.db.clone());
    let user = auth
        .authenticate(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials.".to_string()))?;

    let token = state
        .tokens
        .issue(user.id, user.role)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token issuance failed: {e}")))?;

    info!(username = %user.username, "user logged in");
    Ok(Json(json!({ "token": token })))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let repo = UserRepository::new(&state.db);
    if repo
        .find_by_username(&payload.username)
        .await
        .map_err(map_db_error)?
        .is_some()
    {
        return Err(AppError::Conflict("Username already exists.".to_string()));
    }

    let hash = AuthService::hash_password(&payload.password)?;
    let user = repo
        .create(&payload.username, &hash, payload.role)
        .await
        .map_err(map_db_error)?;

    info!(username = %user.username, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}
