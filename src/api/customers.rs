//! Customer endpoints (admin only, list and detail responses cached)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::CustomerRepository;
use crate::middleware::auth::require_role;
use crate::middleware::cache::response_cache_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{customer, Customer, CustomerPayload, Role};
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let cache = from_fn_with_state(state.response_cache.clone(), response_cache_middleware);

    let reads = Router::new()
        .route("/", get(list_customers).layer(cache.clone()))
        .route("/{id}", get(get_customer).layer(cache))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ));

    let writes = Router::new()
        .route("/", post(create_customer))
        .route("/{id}", put(update_customer).delete(delete_customer))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(reads)
        .merge(writes)
        .layer(from_fn(require_role(Role::Admin)))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let q = params.validate(customer::SORTABLE_FIELDS, "name")?;
    let page = CustomerRepository::new(&state.db)
        .list(&q)
        .await
        .map_err(map_db_error)?;
    Ok(Json(page.envelope("customers", q.include_meta)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let customer = CustomerRepository::new(&state.db)
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
    Ok(Json(customer))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    payload.validate()?;
    let customer = CustomerRepository::new(&state.db)
        .create(&payload)
        .await
        .map_err(map_db_error)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPayload>,
) -> AppResult<Json<Customer>> {
    payload.validate()?;
    let customer = CustomerRepository::new(&state.db)
        .update(id, &payload)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let deleted = CustomerRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(map_db_error)?;
    if !deleted {
        return Err(AppError::NotFound("Customer not found".to_string()));
    }
    Ok(Json(json!({ "message": "Customer deleted" })))
}
