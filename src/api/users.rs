//! User management endpoints
//!
//! Listing is open to admins; everything touching a single account is
//! super_admin only. List and get-by-id responses are cached.

use axum::{
    extract::{Path, Query, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::UserRepository;
use crate::middleware::auth::require_role;
use crate::middleware::cache::response_cache_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{Role, UpdateUserRequest, User};
use crate::services::AuthService;
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::AppState;

const SORTABLE_FIELDS: &[&str] = &["username", "role"];

pub fn routes(state: &AppState) -> Router<AppState> {
    let cache = from_fn_with_state(state.response_cache.clone(), response_cache_middleware);

    let list = Router::new()
        .route("/", get(list_users).layer(cache.clone()))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::Admin)));

    let get_one = Router::new()
        .route("/{id}", get(get_user).layer(cache))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::SuperAdmin)));

    let writes = Router::new()
        .route("/{id}", put(update_user).delete(delete_user))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::SuperAdmin)));

    Router::new().merge(list).merge(get_one).merge(writes)
}

async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let q = params.validate(SORTABLE_FIELDS, "username")?;
    let page = UserRepository::new(&state.db)
        .list(&q)
        .await
        .map_err(map_db_error)?;
    Ok(Json(page.envelope("users", q.include_meta)))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<User>> {
    let user = UserRepository::new(&state.db)
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    payload.validate()?;

    let password_hash = match &payload.password {
        Some(password) => Some(AuthService::hash_password(password)?),
        None => None,
    };

    let user = UserRepository::new(&state.db)
        .update(
            id,
            payload.username.as_deref(),
            password_hash.as_deref(),
            payload.role,
        )
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Value>> {
    let deleted = UserRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(map_db_error)?;
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(json!({ "message": "User deleted" })))
}
