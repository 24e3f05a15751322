//! Order endpoints
//!
//! Ordinary users may place orders; everything else is admin territory.
//! The order total is always computed server-side from the product's
//! current price.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::{CustomerRepository, OrderRepository, ProductRepository};
use crate::middleware::auth::require_role;
use crate::middleware::cache::response_cache_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{order, CreateOrderRequest, Order, Role};
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let reads = Router::new()
        .route(
            "/",
            get(list_orders).layer(from_fn_with_state(
                state.response_cache.clone(),
                response_cache_middleware,
            )),
        )
        .route("/{id}", get(get_order))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::Admin)));

    let create = Router::new()
        .route("/", post(create_order))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::User)));

    let admin_writes = Router::new()
        .route("/{id}", put(update_order).delete(delete_order))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::Admin)));

    Router::new().merge(reads).merge(create).merge(admin_writes)
}

async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let q = params.validate(order::SORTABLE_FIELDS, "created_at")?;
    let page = OrderRepository::new(&state.db)
        .list(&q)
        .await
        .map_err(map_db_error)?;
    Ok(Json(page.envelope("orders", q.include_meta)))
}

async fn get_order(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Order>> {
    let order = OrderRepository::new(&state.db)
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}

async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    payload.validate()?;

    let product = ProductRepository::new(&state.db)
        .get(payload.product_id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::Validation("Invalid product_id.".to_string()))?;

    CustomerRepository::new(&state.db)
        .get(payload.customer_id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::Validation("Invalid customer_id.".to_string()))?;

    let total_price = product.price * payload.quantity as f64;
    let order = OrderRepository::new(&state.db)
        .create(
            payload.customer_id,
            payload.product_id,
            payload.quantity,
            total_price,
        )
        .await
        .map_err(map_db_error)?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Update the quantity; the total is recomputed from the product's current
/// price, not the price at order time.
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<Order>> {
    if payload.quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let repo = OrderRepository::new(&state.db);
    let existing = repo
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let product = ProductRepository::new(&state.db)
        .get(existing.product_id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let total_price = product.price * payload.quantity as f64;
    let order = repo
        .update_quantity(id, payload.quantity, total_price)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

#[derive(Debug, serde::Deserialize)]
struct UpdateOrderRequest {
    quantity: i64,
}

async fn delete_order(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Value>> {
    let deleted = OrderRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(map_db_error)?;
    if !deleted {
        return Err(AppError::NotFound("Order not found".to_string()));
    }
    Ok(Json(json!({ "message": "Order deleted" })))
}
